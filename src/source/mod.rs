//! Raw JSON sources: song metadata files and activity log files.

mod models;

pub use models::{LogEvent, RawSong, NEXT_SONG_PAGE};

use crate::storage::{DatasetStorage, SourcePattern, StorageError};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid source pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No input files match '{pattern}' in {location}")]
    NoInput { pattern: String, location: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Malformed record in {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Records read from every file matching a pattern.
#[derive(Debug)]
pub struct SourceBatch<T> {
    pub files: usize,
    pub records: Vec<T>,
}

/// Parse a file holding one or more JSON objects separated by whitespace
/// (one per line for logs, a single object for song files).
fn parse_records<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<Vec<T>, SourceError> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<T>()
        .map(|record| {
            record.map_err(|source| SourceError::Malformed {
                key: key.to_string(),
                source,
            })
        })
        .collect()
}

/// Read and deserialize every record of every file matching `pattern`.
///
/// Files are parsed in parallel; the result keeps file order (sorted keys)
/// and record order within each file. A pattern matching nothing, or any
/// record that fails to deserialize, fails the whole read.
pub fn read_json_records<T>(
    storage: &dyn DatasetStorage,
    pattern: &str,
) -> Result<SourceBatch<T>, SourceError>
where
    T: DeserializeOwned + Send,
{
    let selector = SourcePattern::new(pattern).map_err(|source| SourceError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let keys: Vec<String> = storage
        .list(selector.prefix())?
        .into_iter()
        .filter(|key| selector.matches(key))
        .collect();
    if keys.is_empty() {
        return Err(SourceError::NoInput {
            pattern: pattern.to_string(),
            location: storage.location(),
        });
    }
    debug!("{} files match {}", keys.len(), selector);

    let per_file: Vec<Vec<T>> = keys
        .par_iter()
        .map(|key| -> Result<Vec<T>, SourceError> {
            let bytes = storage.read(key)?;
            parse_records(key, &bytes)
        })
        .collect::<Result<_, SourceError>>()?;

    let records: Vec<T> = per_file.into_iter().flatten().collect();
    info!(
        "Read {} records from {} files matching {}",
        records.len(),
        keys.len(),
        selector
    );

    Ok(SourceBatch {
        files: keys.len(),
        records,
    })
}
