use super::RowIdentity;
use crate::dataset::ColumnarRow;
use crate::source::LogEvent;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Row of the `users` dimension.
///
/// Deduplication is on the whole row, so a user whose level changed between
/// events keeps one row per level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserRecord {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl UserRecord {
    pub fn from_event(event: &LogEvent) -> Option<Self> {
        Some(Self {
            user_id: event.user_id.clone()?,
            first_name: event.first_name.clone(),
            last_name: event.last_name.clone(),
            gender: event.gender.clone(),
            level: event.level.clone(),
        })
    }
}

impl RowIdentity for UserRecord {
    type Key = UserRecord;

    fn row_key(&self) -> Self::Key {
        self.clone()
    }
}

impl ColumnarRow for UserRecord {
    const TABLE: &'static str = "users";

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, false),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        let user_ids = rows
            .iter()
            .map(|r| Some(r.user_id.as_str()))
            .collect::<Vec<_>>();
        let first_names = rows.iter().map(|r| r.first_name.as_deref()).collect::<Vec<_>>();
        let last_names = rows.iter().map(|r| r.last_name.as_deref()).collect::<Vec<_>>();
        let genders = rows.iter().map(|r| r.gender.as_deref()).collect::<Vec<_>>();
        let levels = rows.iter().map(|r| r.level.as_deref()).collect::<Vec<_>>();

        RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(StringArray::from(user_ids)) as ArrayRef,
                Arc::new(StringArray::from(first_names)) as ArrayRef,
                Arc::new(StringArray::from(last_names)) as ArrayRef,
                Arc::new(StringArray::from(genders)) as ArrayRef,
                Arc::new(StringArray::from(levels)) as ArrayRef,
            ],
        )
    }
}
