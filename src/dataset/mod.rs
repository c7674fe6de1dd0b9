//! Partitioned columnar datasets.
//!
//! A dataset is a directory of Parquet files under `<table>/`, optionally
//! split into hive-style partition directories, completed by an empty
//! `<table>/_SUCCESS` marker. Every write replaces the whole table.

mod parquet_io;
mod partition;

pub use parquet_io::{
    col_f64, col_i32, col_i64, col_string, decode_batches, encode_batch, opt_f64, opt_str,
};
pub use partition::{parse_partition_path, partition_path, PartitionValues, DEFAULT_PARTITION};

use crate::storage::{join_key, DatasetStorage, StorageError};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::errors::ParquetError;
use rayon::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

pub const SUCCESS_MARKER: &str = "_SUCCESS";
const PART_FILE: &str = "part-00000.snappy.parquet";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Table not found or incomplete: {0}")]
    MissingTable(String),

    #[error("Schema mismatch: {0}")]
    Schema(String),
}

/// A row type that can be persisted as a columnar table.
pub trait ColumnarRow: Sized + Send + Sync {
    /// Table directory name under the output root.
    const TABLE: &'static str;

    /// Columns encoded in the directory layout rather than in the files, in
    /// nesting order. Each must be a field of [`ColumnarRow::schema`].
    const PARTITION_COLUMNS: &'static [&'static str] = &[];

    /// Full schema, partition columns included.
    fn schema() -> SchemaRef;

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError>;

    /// Values of [`ColumnarRow::PARTITION_COLUMNS`], rendered as strings.
    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }
}

/// Outcome of a dataset write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub table: String,
    pub rows: usize,
    pub files: usize,
}

/// One decoded batch together with the partition values of its file.
#[derive(Debug, Clone)]
pub struct PartitionedBatch {
    pub partition: PartitionValues,
    pub batch: RecordBatch,
}

impl PartitionedBatch {
    /// Value of a partition column; `None` when null or not a partition of this file.
    pub fn partition_value(&self, column: &str) -> Option<&str> {
        self.partition
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }
}

fn data_column_indices<R: ColumnarRow>(schema: &SchemaRef) -> Vec<usize> {
    schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| !R::PARTITION_COLUMNS.contains(&field.name().as_str()))
        .map(|(idx, _)| idx)
        .collect()
}

/// Write `rows` as the table `R::TABLE`, replacing whatever was there.
pub fn write_dataset<R: ColumnarRow>(
    storage: &dyn DatasetStorage,
    rows: &[R],
) -> Result<WriteSummary, DatasetError> {
    let schema = R::schema();
    for column in R::PARTITION_COLUMNS {
        if schema.index_of(column).is_err() {
            return Err(DatasetError::Schema(format!(
                "partition column '{}' not in {} schema",
                column,
                R::TABLE
            )));
        }
    }
    let keep = data_column_indices::<R>(&schema);

    let mut groups: BTreeMap<Vec<Option<String>>, Vec<&R>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.partition_values()).or_default().push(row);
    }
    // Unpartitioned tables always carry one file holding the schema.
    if groups.is_empty() && R::PARTITION_COLUMNS.is_empty() {
        groups.insert(Vec::new(), Vec::new());
    }

    let files: Vec<(String, Bytes)> = groups
        .into_iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(values, group)| -> Result<(String, Bytes), DatasetError> {
            let batch = R::to_batch(&group)?.project(&keep)?;
            let bytes = encode_batch(&batch)?;
            let dir = partition_path(R::PARTITION_COLUMNS, &values);
            Ok((join_key([R::TABLE, dir.as_str(), PART_FILE]), bytes))
        })
        .collect::<Result<_, DatasetError>>()?;

    storage.delete_prefix(R::TABLE)?;
    for (key, bytes) in &files {
        debug!("Writing {} ({} bytes)", key, bytes.len());
        storage.write(key, bytes.clone())?;
    }
    storage.write(&join_key([R::TABLE, SUCCESS_MARKER]), Bytes::new())?;

    info!(
        "Wrote {} rows to {} in {} files at {}",
        rows.len(),
        R::TABLE,
        files.len(),
        storage.location()
    );

    Ok(WriteSummary {
        table: R::TABLE.to_string(),
        rows: rows.len(),
        files: files.len(),
    })
}

/// Read back every file of a completed table.
///
/// Fails with [`DatasetError::MissingTable`] when the table was never written
/// or its write did not finish.
pub fn read_dataset(
    storage: &dyn DatasetStorage,
    table: &str,
) -> Result<Vec<PartitionedBatch>, DatasetError> {
    if !storage.exists(&join_key([table, SUCCESS_MARKER]))? {
        return Err(DatasetError::MissingTable(format!(
            "{} at {}",
            table,
            storage.location()
        )));
    }

    let prefix = format!("{}/", table);
    let keys: Vec<String> = storage
        .list(table)?
        .into_iter()
        .filter(|k| k.ends_with(".parquet"))
        .collect();

    let batches: Vec<Vec<PartitionedBatch>> = keys
        .par_iter()
        .map(|key| -> Result<Vec<PartitionedBatch>, DatasetError> {
            let partition = parse_partition_path(key.strip_prefix(&prefix).unwrap_or(key));
            let batches = decode_batches(storage.read(key)?)?;
            Ok(batches
                .into_iter()
                .map(|batch| PartitionedBatch {
                    partition: partition.clone(),
                    batch,
                })
                .collect())
        })
        .collect::<Result<_, DatasetError>>()?;

    Ok(batches.into_iter().flatten().collect())
}
