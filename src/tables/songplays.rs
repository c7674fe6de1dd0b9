use crate::dataset::ColumnarRow;
use arrow::array::{ArrayRef, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Timestamps are stored as UTC instants; calendar columns carry the local view.
const TIMESTAMP_TZ: &str = "UTC";

/// Row of the `songplays` fact table, partitioned by `(year, month)`.
///
/// `song_id` and `artist_id` are `None` when the play could not be resolved
/// against the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongplayRecord {
    pub songplay_id: i64,
    /// Microseconds since the epoch.
    pub start_time: Option<i64>,
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl SongplayRecord {
    pub fn is_resolved(&self) -> bool {
        self.song_id.is_some()
    }
}

impl ColumnarRow for SongplayRecord {
    const TABLE: &'static str = "songplays";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new(
                "start_time",
                DataType::Timestamp(TimeUnit::Microsecond, Some(TIMESTAMP_TZ.into())),
                true,
            ),
            Field::new("user_id", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
            Field::new("year", DataType::Int32, true),
            Field::new("month", DataType::Int32, true),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        let ids = Int64Array::from(rows.iter().map(|r| r.songplay_id).collect::<Vec<_>>());
        let start_times =
            TimestampMicrosecondArray::from(rows.iter().map(|r| r.start_time).collect::<Vec<_>>())
                .with_timezone(TIMESTAMP_TZ);
        let user_ids = StringArray::from(rows.iter().map(|r| r.user_id.as_deref()).collect::<Vec<_>>());
        let levels = StringArray::from(rows.iter().map(|r| r.level.as_deref()).collect::<Vec<_>>());
        let song_ids = StringArray::from(rows.iter().map(|r| r.song_id.as_deref()).collect::<Vec<_>>());
        let artist_ids =
            StringArray::from(rows.iter().map(|r| r.artist_id.as_deref()).collect::<Vec<_>>());
        let session_ids = Int64Array::from(rows.iter().map(|r| r.session_id).collect::<Vec<_>>());
        let locations =
            StringArray::from(rows.iter().map(|r| r.location.as_deref()).collect::<Vec<_>>());
        let user_agents =
            StringArray::from(rows.iter().map(|r| r.user_agent.as_deref()).collect::<Vec<_>>());
        let years = Int32Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>());
        let months = Int32Array::from(rows.iter().map(|r| r.month).collect::<Vec<_>>());

        RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(ids) as ArrayRef,
                Arc::new(start_times) as ArrayRef,
                Arc::new(user_ids) as ArrayRef,
                Arc::new(levels) as ArrayRef,
                Arc::new(song_ids) as ArrayRef,
                Arc::new(artist_ids) as ArrayRef,
                Arc::new(session_ids) as ArrayRef,
                Arc::new(locations) as ArrayRef,
                Arc::new(user_agents) as ArrayRef,
                Arc::new(years) as ArrayRef,
                Arc::new(months) as ArrayRef,
            ],
        )
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![
            self.year.map(|y| y.to_string()),
            self.month.map(|m| m.to_string()),
        ]
    }
}
