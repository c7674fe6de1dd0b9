//! Parquet encoding/decoding and typed column access.

use super::DatasetError;
use arrow::array::{Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_created_by(format!("sparkify-etl {}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Encode a batch as a complete Parquet file.
pub fn encode_batch(batch: &RecordBatch) -> Result<Bytes, DatasetError> {
    let mut buffer = Vec::<u8>::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(writer_properties()))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(Bytes::from(buffer))
}

/// Decode every record batch of a Parquet file.
pub fn decode_batches(bytes: Bytes) -> Result<Vec<RecordBatch>, DatasetError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)?.build()?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}

fn column<'a, T: 'static>(
    batch: &'a RecordBatch,
    name: &str,
    type_name: &str,
) -> Result<&'a T, DatasetError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| DatasetError::Schema(format!("missing column '{}'", name)))?;
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| DatasetError::Schema(format!("column '{}' is not {}", name, type_name)))
}

pub fn col_string<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, DatasetError> {
    column(batch, name, "StringArray")
}

pub fn col_f64<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array, DatasetError> {
    column(batch, name, "Float64Array")
}

pub fn col_i32<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array, DatasetError> {
    column(batch, name, "Int32Array")
}

pub fn col_i64<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int64Array, DatasetError> {
    column(batch, name, "Int64Array")
}

/// Value at `row`, or `None` when null.
pub fn opt_str(col: &StringArray, row: usize) -> Option<String> {
    if col.is_null(row) {
        None
    } else {
        Some(col.value(row).to_string())
    }
}

pub fn opt_f64(col: &Float64Array, row: usize) -> Option<f64> {
    if col.is_null(row) {
        None
    } else {
        Some(col.value(row))
    }
}
