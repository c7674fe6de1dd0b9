use super::{float_key, RowIdentity};
use crate::dataset::{
    col_f64, col_string, opt_f64, opt_str, ColumnarRow, DatasetError, PartitionedBatch,
};
use crate::source::RawSong;
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Row of the `songs` dimension, partitioned by `(year, artist_id)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i32>,
    /// Seconds.
    pub duration: Option<f64>,
}

impl SongRecord {
    /// Project a catalog record, `None` when it has no song id.
    pub fn from_raw(raw: &RawSong) -> Option<Self> {
        Some(Self {
            song_id: raw.song_id.clone()?,
            title: raw.title.clone(),
            artist_id: raw.artist_id.clone(),
            year: raw.year,
            duration: raw.duration,
        })
    }

    /// Rebuild rows from a written `songs` dataset, taking `year` and
    /// `artist_id` from the partition directories.
    pub fn from_batches(batches: &[PartitionedBatch]) -> Result<Vec<Self>, DatasetError> {
        let mut out = Vec::new();
        for part in batches {
            let year = match part.partition_value("year") {
                Some(v) => Some(v.parse::<i32>().map_err(|e| {
                    DatasetError::Schema(format!("bad year partition '{}': {}", v, e))
                })?),
                None => None,
            };
            let artist_id = part.partition_value("artist_id").map(str::to_string);

            let song_ids = col_string(&part.batch, "song_id")?;
            let title = col_string(&part.batch, "title")?;
            let duration = col_f64(&part.batch, "duration")?;

            for row in 0..part.batch.num_rows() {
                let Some(song_id) = opt_str(song_ids, row) else {
                    return Err(DatasetError::Schema("null song_id in songs".to_string()));
                };
                out.push(Self {
                    song_id,
                    title: opt_str(title, row),
                    artist_id: artist_id.clone(),
                    year,
                    duration: opt_f64(duration, row),
                });
            }
        }
        Ok(out)
    }
}

impl RowIdentity for SongRecord {
    type Key = (String, Option<String>, Option<String>, Option<i32>, Option<u64>);

    fn row_key(&self) -> Self::Key {
        (
            self.song_id.clone(),
            self.title.clone(),
            self.artist_id.clone(),
            self.year,
            float_key(self.duration),
        )
    }
}

impl ColumnarRow for SongRecord {
    const TABLE: &'static str = "songs";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year", "artist_id"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("year", DataType::Int32, true),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        let song_ids = StringArray::from(
            rows.iter()
                .map(|r| Some(r.song_id.as_str()))
                .collect::<Vec<_>>(),
        );
        let titles = StringArray::from(rows.iter().map(|r| r.title.as_deref()).collect::<Vec<_>>());
        let artist_ids =
            StringArray::from(rows.iter().map(|r| r.artist_id.as_deref()).collect::<Vec<_>>());
        let years = Int32Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>());
        let durations = Float64Array::from(rows.iter().map(|r| r.duration).collect::<Vec<_>>());

        RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(song_ids) as ArrayRef,
                Arc::new(titles) as ArrayRef,
                Arc::new(artist_ids) as ArrayRef,
                Arc::new(years) as ArrayRef,
                Arc::new(durations) as ArrayRef,
            ],
        )
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![self.year.map(|y| y.to_string()), self.artist_id.clone()]
    }
}
