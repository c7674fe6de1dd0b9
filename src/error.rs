use crate::dataset::DatasetError;
use crate::source::SourceError;
use thiserror::Error;

/// Fatal pipeline failures. None of them is retried; each aborts the run.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Input unreadable, empty, or records that do not fit the expected shape.
    #[error("Failed to read {source_name} source: {source}")]
    SourceRead {
        source_name: &'static str,
        #[source]
        source: SourceError,
    },

    /// A table written by an earlier stage cannot be read back.
    #[error("Required table '{table}' is unavailable: {source}")]
    DependencyMissing {
        table: &'static str,
        #[source]
        source: DatasetError,
    },

    #[error("Failed to write table '{table}': {source}")]
    Write {
        table: &'static str,
        #[source]
        source: DatasetError,
    },
}
