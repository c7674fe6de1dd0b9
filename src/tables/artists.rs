use super::{float_key, RowIdentity};
use crate::dataset::ColumnarRow;
use crate::source::RawSong;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Row of the `artists` dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ArtistRecord {
    pub fn from_raw(raw: &RawSong) -> Option<Self> {
        Some(Self {
            artist_id: raw.artist_id.clone()?,
            name: raw.artist_name.clone(),
            location: raw.artist_location.clone(),
            latitude: raw.artist_latitude,
            longitude: raw.artist_longitude,
        })
    }
}

impl RowIdentity for ArtistRecord {
    type Key = (String, Option<String>, Option<String>, Option<u64>, Option<u64>);

    fn row_key(&self) -> Self::Key {
        (
            self.artist_id.clone(),
            self.name.clone(),
            self.location.clone(),
            float_key(self.latitude),
            float_key(self.longitude),
        )
    }
}

impl ColumnarRow for ArtistRecord {
    const TABLE: &'static str = "artists";

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(StringArray::from(
                    rows.iter()
                        .map(|r| Some(r.artist_id.as_str()))
                        .collect::<Vec<_>>(),
                )) as ArrayRef,
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.name.as_deref()).collect::<Vec<_>>(),
                )) as ArrayRef,
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.location.as_deref()).collect::<Vec<_>>(),
                )) as ArrayRef,
                Arc::new(Float64Array::from(
                    rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
                )) as ArrayRef,
                Arc::new(Float64Array::from(
                    rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
                )) as ArrayRef,
            ],
        )
    }
}
