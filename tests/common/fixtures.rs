//! Sample input trees and helpers to inspect the written tables.

use super::constants::*;
use arrow::array::{Array, TimestampMicrosecondArray};
use chrono_tz::Tz;
use sparkify_etl::dataset::{col_i64, col_string, opt_str, read_dataset, PartitionedBatch};
use sparkify_etl::{
    run_pipeline, EtlError, ObjectStorage, PipelineContext, PipelineSettings, RunReport,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Input and output trees of one test, removed on drop.
pub struct TestLake {
    _dir: TempDir,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

impl TestLake {
    /// A lake holding the sample catalog and activity log.
    pub fn new() -> Self {
        let lake = Self::empty();
        for (key, content) in SONG_FILES {
            lake.write_input(key, content);
        }
        lake.write_input(LOG_FILE_KEY, LOG_EVENTS);
        lake
    }

    /// A lake with empty input and output directories.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input_root = dir.path().join("input");
        let output_root = dir.path().join("output");
        fs::create_dir_all(&input_root).expect("Failed to create input root");
        fs::create_dir_all(&output_root).expect("Failed to create output root");
        Self {
            _dir: dir,
            input_root,
            output_root,
        }
    }

    pub fn write_input(&self, key: &str, content: &str) {
        let path = self.input_root.join(key);
        fs::create_dir_all(path.parent().expect("Input key has no parent"))
            .expect("Failed to create input dir");
        fs::write(path, content).expect("Failed to write input file");
    }

    pub fn remove_input(&self, key: &str) {
        fs::remove_file(self.input_root.join(key)).expect("Failed to remove input file");
    }

    pub fn output(&self) -> ObjectStorage {
        ObjectStorage::local(&self.output_root).expect("Failed to open output storage")
    }

    pub fn output_path(&self, key: &str) -> PathBuf {
        self.output_root.join(key)
    }

    pub fn try_run_with(&self, settings: PipelineSettings) -> Result<RunReport, EtlError> {
        let ctx = PipelineContext::new(
            Arc::new(
                ObjectStorage::local(&self.input_root).expect("Failed to open input storage"),
            ),
            Arc::new(self.output()),
            settings,
        );
        run_pipeline(&ctx)
    }

    pub fn run(&self) -> RunReport {
        self.try_run_with(PipelineSettings::default())
            .expect("Pipeline run failed")
    }

    pub fn run_in(&self, timezone: Tz) -> RunReport {
        let settings = PipelineSettings {
            timezone,
            ..Default::default()
        };
        self.try_run_with(settings).expect("Pipeline run failed")
    }

    pub fn table(&self, table: &str) -> Vec<PartitionedBatch> {
        read_dataset(&self.output(), table).expect("Failed to read table")
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.table(table).iter().map(|b| b.batch.num_rows()).sum()
    }

    /// Relative paths of every file under the output root, sorted.
    pub fn output_files(&self) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(&self.output_root)
            .into_iter()
            .map(|entry| entry.expect("Failed to walk output dir"))
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let relative = entry
                    .path()
                    .strip_prefix(&self.output_root)
                    .expect("Path outside root");
                relative.to_string_lossy().replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }
}

/// A decoded `songplays` row, with its partition values.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplayRow {
    pub songplay_id: i64,
    pub start_time_micros: Option<i64>,
    pub user_id: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

pub fn songplay_rows(lake: &TestLake) -> Vec<SongplayRow> {
    let mut rows = Vec::new();
    for part in lake.table("songplays") {
        let batch = &part.batch;
        let ids = col_i64(batch, "songplay_id").unwrap();
        let start_times = batch
            .column_by_name("start_time")
            .unwrap()
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .unwrap();
        let users = col_string(batch, "user_id").unwrap();
        let songs = col_string(batch, "song_id").unwrap();
        let artists = col_string(batch, "artist_id").unwrap();
        for i in 0..batch.num_rows() {
            rows.push(SongplayRow {
                songplay_id: ids.value(i),
                start_time_micros: (!start_times.is_null(i)).then(|| start_times.value(i)),
                user_id: opt_str(users, i),
                song_id: opt_str(songs, i),
                artist_id: opt_str(artists, i),
                year: part.partition_value("year").map(str::to_string),
                month: part.partition_value("month").map(str::to_string),
            });
        }
    }
    rows.sort_by_key(|r| r.songplay_id);
    rows
}
