//! The two extraction stages and the orchestrator running them.
//!
//! 1. Catalog stage: song metadata -> `songs`, `artists`
//! 2. Event stage: activity logs + the freshly written `songs` -> `users`,
//!    `time`, `songplays`
//!
//! Every table is fully rewritten on each run. A failure aborts the run and
//! may leave earlier tables of the same run already replaced.

mod catalog;
mod dedup;
mod events;
mod resolve;

pub use catalog::{process_song_data, CatalogReport};
pub use dedup::drop_duplicates;
pub use events::{process_log_data, EventReport};
pub use resolve::{resolve_songplays, SongIndex, SongplayIdGenerator};

use crate::dataset::{write_dataset, ColumnarRow, WriteSummary};
use crate::error::EtlError;
use crate::storage::DatasetStorage;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_SONG_DATA_PATTERN: &str = "song_data/*/*/*/*.json";
pub const DEFAULT_LOG_DATA_PATTERN: &str = "log_data/*/*/*.json";

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Song metadata files, relative to the input root.
    pub song_data_pattern: String,
    /// Activity log files, relative to the input root.
    pub log_data_pattern: String,
    /// Calendar used to decompose event timestamps.
    pub timezone: Tz,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            song_data_pattern: DEFAULT_SONG_DATA_PATTERN.to_string(),
            log_data_pattern: DEFAULT_LOG_DATA_PATTERN.to_string(),
            timezone: Tz::UTC,
        }
    }
}

/// Input and output locations of a run, plus its settings.
#[derive(Clone)]
pub struct PipelineContext {
    input: Arc<dyn DatasetStorage>,
    output: Arc<dyn DatasetStorage>,
    settings: PipelineSettings,
}

impl PipelineContext {
    pub fn new(
        input: Arc<dyn DatasetStorage>,
        output: Arc<dyn DatasetStorage>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            input,
            output,
            settings,
        }
    }

    pub fn input(&self) -> &dyn DatasetStorage {
        self.input.as_ref()
    }

    pub fn output(&self) -> &dyn DatasetStorage {
        self.output.as_ref()
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub catalog: CatalogReport,
    pub events: EventReport,
}

/// Write one table, reporting completion on stdout.
fn write_table<R: ColumnarRow>(
    storage: &dyn DatasetStorage,
    rows: &[R],
) -> Result<WriteSummary, EtlError> {
    let summary = write_dataset(storage, rows).map_err(|source| EtlError::Write {
        table: R::TABLE,
        source,
    })?;
    println!("--- {} completed ({} rows) ---", summary.table, summary.rows);
    Ok(summary)
}

/// Run the catalog stage, then the event stage.
///
/// The event stage reads the `songs` table back from the output, so the
/// order is fixed.
pub fn run_pipeline(ctx: &PipelineContext) -> Result<RunReport, EtlError> {
    info!(
        "Running pipeline: input {}, output {}, timezone {}",
        ctx.input().location(),
        ctx.output().location(),
        ctx.settings().timezone.name()
    );
    let ids = SongplayIdGenerator::new();

    let catalog = process_song_data(ctx)?;
    let events = process_log_data(ctx, &ids)?;

    println!("END");
    Ok(RunReport { catalog, events })
}
