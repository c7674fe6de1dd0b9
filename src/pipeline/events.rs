//! Event stage: activity logs into `users`, `time` and `songplays`.

use super::{drop_duplicates, write_table, PipelineContext, SongIndex, SongplayIdGenerator};
use super::resolve::resolve_songplays;
use crate::dataset::{read_dataset, ColumnarRow, WriteSummary};
use crate::error::EtlError;
use crate::source::{read_json_records, LogEvent, SourceBatch};
use crate::tables::{EventInstant, SongRecord, TimeRecord, UserRecord};
use rayon::prelude::*;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EventReport {
    pub source_files: usize,
    pub source_records: usize,
    /// Events left after keeping only song plays.
    pub song_play_events: usize,
    pub users: WriteSummary,
    pub time: WriteSummary,
    pub songplays: WriteSummary,
    pub resolved_songplays: usize,
}

impl EventReport {
    pub fn unresolved_songplays(&self) -> usize {
        self.songplays.rows - self.resolved_songplays
    }
}

/// Read every log file and write the `users`, `time` and `songplays` tables.
///
/// `songplays` is resolved against the `songs` table already present in the
/// output, so [`super::process_song_data`] must have completed first.
pub fn process_log_data(
    ctx: &PipelineContext,
    ids: &SongplayIdGenerator,
) -> Result<EventReport, EtlError> {
    let pattern = &ctx.settings().log_data_pattern;
    info!("Reading log data from {}/{}", ctx.input().location(), pattern);

    let batch: SourceBatch<LogEvent> =
        read_json_records(ctx.input(), pattern).map_err(|source| EtlError::SourceRead {
            source_name: "log_data",
            source,
        })?;
    let source_records = batch.records.len();

    let plays: Vec<LogEvent> = batch
        .records
        .into_iter()
        .filter(LogEvent::is_song_play)
        .collect();
    info!(
        "{} of {} events are song plays",
        plays.len(),
        source_records
    );

    let users = drop_duplicates(plays.iter().filter_map(UserRecord::from_event));
    let users_summary = write_table(ctx.output(), &users)?;

    let tz = ctx.settings().timezone;
    let instants: Vec<Option<EventInstant>> = plays
        .par_iter()
        .map(|event| event.ts.and_then(|ts| EventInstant::from_epoch_millis(ts, &tz)))
        .collect();
    let without_time = instants.iter().filter(|i| i.is_none()).count();
    if without_time > 0 {
        warn!("{} song plays have no usable timestamp", without_time);
    }

    let time = drop_duplicates(instants.iter().flatten().map(TimeRecord::from));
    let time_summary = write_table(ctx.output(), &time)?;

    let songs = read_dataset(ctx.output(), SongRecord::TABLE)
        .and_then(|batches| SongRecord::from_batches(&batches))
        .map_err(|source| EtlError::DependencyMissing {
            table: SongRecord::TABLE,
            source,
        })?;
    let index = SongIndex::build(&songs);
    info!(
        "Resolving song plays against {} songs ({} title/duration keys)",
        songs.len(),
        index.len()
    );

    let songplays = resolve_songplays(&plays, &instants, &index, ids);
    let resolved = songplays.iter().filter(|p| p.is_resolved()).count();
    info!(
        "{} of {} song plays resolved to a catalog song",
        resolved,
        songplays.len()
    );
    let songplays_summary = write_table(ctx.output(), &songplays)?;

    println!("*** process_log_data completed ***\n");

    Ok(EventReport {
        source_files: batch.files,
        source_records,
        song_play_events: plays.len(),
        users: users_summary,
        time: time_summary,
        songplays: songplays_summary,
        resolved_songplays: resolved,
    })
}
