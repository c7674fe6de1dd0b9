//! Hive-style partition directories (`year=2018/month=11`).

use std::borrow::Cow;

/// Directory value used for a null partition column.
pub const DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Partition column name paired with its (nullable) value.
pub type PartitionValues = Vec<(String, Option<String>)>;

/// Render `col=value` segments for the given columns and values.
pub fn partition_path(columns: &[&str], values: &[Option<String>]) -> String {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| {
            let value = match value {
                Some(v) if !v.is_empty() => urlencoding::encode(v),
                _ => Cow::Borrowed(DEFAULT_PARTITION),
            };
            format!("{}={}", column, value)
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse the `col=value` segments of a file key relative to its table root.
///
/// Segments without `=` (the file name) are ignored.
pub fn parse_partition_path(relative_key: &str) -> PartitionValues {
    relative_key
        .split('/')
        .filter_map(|segment| {
            let (column, raw) = segment.split_once('=')?;
            let value = if raw == DEFAULT_PARTITION {
                None
            } else {
                Some(
                    urlencoding::decode(raw)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| raw.to_string()),
                )
            };
            Some((column.to_string(), value))
        })
        .collect()
}
