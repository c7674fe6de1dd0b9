//! Catalog stage: song metadata into the `songs` and `artists` tables.

use super::{drop_duplicates, write_table, PipelineContext};
use crate::dataset::WriteSummary;
use crate::error::EtlError;
use crate::source::{read_json_records, RawSong, SourceBatch};
use crate::tables::{ArtistRecord, SongRecord};
use tracing::info;

#[derive(Debug, Clone)]
pub struct CatalogReport {
    pub source_files: usize,
    pub source_records: usize,
    pub songs: WriteSummary,
    pub artists: WriteSummary,
}

/// Read every song metadata file and write the `songs` and `artists` tables.
///
/// `songs` is partitioned by `(year, artist_id)`, `artists` is unpartitioned.
/// Rows without a key are dropped and exact duplicates removed.
pub fn process_song_data(ctx: &PipelineContext) -> Result<CatalogReport, EtlError> {
    let pattern = &ctx.settings().song_data_pattern;
    info!("Reading song data from {}/{}", ctx.input().location(), pattern);

    let batch: SourceBatch<RawSong> =
        read_json_records(ctx.input(), pattern).map_err(|source| EtlError::SourceRead {
            source_name: "song_data",
            source,
        })?;

    let songs = drop_duplicates(batch.records.iter().filter_map(SongRecord::from_raw));
    let songs_summary = write_table(ctx.output(), &songs)?;

    let artists = drop_duplicates(batch.records.iter().filter_map(ArtistRecord::from_raw));
    let artists_summary = write_table(ctx.output(), &artists)?;

    println!("*** process_song_data completed ***\n");

    Ok(CatalogReport {
        source_files: batch.files,
        source_records: batch.records.len(),
        songs: songs_summary,
        artists: artists_summary,
    })
}
