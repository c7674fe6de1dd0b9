//! Byte-oriented storage backends.
//!
//! The pipeline never touches the filesystem directly: raw JSON sources are
//! listed and read, and columnar datasets are written, through the
//! [`DatasetStorage`] trait. Keys are `/`-separated paths relative to the
//! storage root, which is either a local directory or an S3 bucket.

mod object;
mod pattern;
mod root;

pub use object::ObjectStorage;
pub use pattern::SourcePattern;
pub use root::StorageRoot;

use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Failed to start storage runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid storage root: {0}")]
    InvalidRoot(String),
}

/// Trait for storage backends holding raw sources and output datasets.
pub trait DatasetStorage: Send + Sync {
    /// List the keys of all objects under `prefix`, sorted.
    ///
    /// A missing prefix is not an error, it simply lists nothing.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Read a whole object.
    fn read(&self, key: &str) -> Result<Bytes, StorageError>;

    /// Write a whole object, replacing any previous content.
    fn write(&self, key: &str, bytes: Bytes) -> Result<(), StorageError>;

    fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Remove every object under `prefix`.
    fn delete_prefix(&self, prefix: &str) -> Result<(), StorageError>;

    /// Human readable description of where the data lives, for logging.
    fn location(&self) -> String;
}

/// Join key segments, ignoring empty ones.
pub fn join_key<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
