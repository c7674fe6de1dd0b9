//! Sparkify ETL Library
//!
//! Turns the raw song catalog and listening activity logs into a star schema
//! of partitioned Parquet tables. Exposes the internal modules for testing.

pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod storage;
pub mod tables;

// Re-export commonly used types for convenience
pub use error::EtlError;
pub use pipeline::{run_pipeline, PipelineContext, PipelineSettings, RunReport};
pub use storage::{DatasetStorage, ObjectStorage, StorageRoot};
