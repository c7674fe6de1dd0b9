//! Resolution of song plays against the catalog.
//!
//! Log events carry only a song title and a duration, so plays are matched to
//! catalog songs on `(title, duration)`. That key is not unique in the
//! catalog; when several songs share it the one with the smallest `song_id`
//! is chosen, so every event yields exactly one songplay.

use crate::source::LogEvent;
use crate::tables::{EventInstant, SongRecord, SongplayRecord};
use rayon::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of `songplay_id` values for one run.
///
/// Ids are handed out in contiguous blocks from an atomic counter, so they
/// strictly increase in the order blocks are reserved and in emission order
/// within a block. They are not stable across runs.
#[derive(Debug, Default)]
pub struct SongplayIdGenerator {
    next: AtomicI64,
}

impl SongplayIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Reserve `count` consecutive ids.
    pub fn reserve(&self, count: usize) -> Range<i64> {
        let count = count as i64;
        let start = self.next.fetch_add(count, Ordering::SeqCst);
        start..start + count
    }
}

/// Exact duration match key; `None` for NaN, which never matches anything.
fn duration_key(duration: f64) -> Option<u64> {
    if duration.is_nan() {
        None
    } else if duration == 0.0 {
        Some(0.0f64.to_bits())
    } else {
        Some(duration.to_bits())
    }
}

/// Lookup of catalog songs by `(title, duration)`.
pub struct SongIndex<'a> {
    by_title: HashMap<&'a str, HashMap<u64, &'a SongRecord>>,
    len: usize,
}

impl<'a> SongIndex<'a> {
    pub fn build(songs: &'a [SongRecord]) -> Self {
        let mut by_title: HashMap<&'a str, HashMap<u64, &'a SongRecord>> = HashMap::new();
        let mut len = 0;
        for song in songs {
            let (Some(title), Some(duration)) = (song.title.as_deref(), song.duration) else {
                continue;
            };
            let Some(key) = duration_key(duration) else {
                continue;
            };
            let slot = by_title.entry(title).or_default();
            match slot.get(&key) {
                Some(existing) if existing.song_id <= song.song_id => {}
                Some(_) => {
                    slot.insert(key, song);
                }
                None => {
                    slot.insert(key, song);
                    len += 1;
                }
            }
        }
        Self { by_title, len }
    }

    pub fn resolve(&self, title: Option<&str>, duration: Option<f64>) -> Option<&'a SongRecord> {
        let key = duration_key(duration?)?;
        self.by_title.get(title?)?.get(&key).copied()
    }

    /// Number of distinct `(title, duration)` keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Build one songplay per event, left-outer joined with the catalog.
///
/// `instants` holds the calendar decomposition of each event, index-aligned
/// with `events`. Ids follow the order of `events`.
pub fn resolve_songplays(
    events: &[LogEvent],
    instants: &[Option<EventInstant>],
    index: &SongIndex<'_>,
    ids: &SongplayIdGenerator,
) -> Vec<SongplayRecord> {
    let mut plays: Vec<SongplayRecord> = events
        .par_iter()
        .zip(instants.par_iter())
        .map(|(event, instant)| {
            let song = index.resolve(event.song.as_deref(), event.length);
            SongplayRecord {
                songplay_id: 0,
                start_time: instant.map(|i| i.timestamp_micros()),
                user_id: event.user_id.clone(),
                level: event.level.clone(),
                song_id: song.map(|s| s.song_id.clone()),
                artist_id: song.and_then(|s| s.artist_id.clone()),
                session_id: event.session_id,
                location: event.location.clone(),
                user_agent: event.user_agent.clone(),
                year: instant.map(|i| i.year),
                month: instant.map(|i| i.month),
            }
        })
        .collect();

    for (play, id) in plays.iter_mut().zip(ids.reserve(events.len())) {
        play.songplay_id = id;
    }
    plays
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    fn song(song_id: &str, title: &str, duration: f64, artist_id: &str) -> SongRecord {
        SongRecord {
            song_id: song_id.to_string(),
            title: Some(title.to_string()),
            artist_id: Some(artist_id.to_string()),
            year: Some(2008),
            duration: Some(duration),
        }
    }

    fn event(song: &str, length: f64, ts: i64) -> LogEvent {
        LogEvent {
            song: Some(song.to_string()),
            length: Some(length),
            ts: Some(ts),
            user_id: Some("10".to_string()),
            level: Some("free".to_string()),
            session_id: Some(9),
            location: Some("Washington-Arlington-Alexandria, DC-VA-MD-WV".to_string()),
            page: Some("NextSong".to_string()),
            ..Default::default()
        }
    }

    fn instants(events: &[LogEvent]) -> Vec<Option<EventInstant>> {
        events
            .iter()
            .map(|e| e.ts.and_then(|ts| EventInstant::from_epoch_millis(ts, &Tz::UTC)))
            .collect()
    }

    #[test]
    fn matches_on_title_and_duration() {
        let songs = vec![song(
            "SOZCTXZ12AB0182364",
            "Setanta matilda",
            269.58321,
            "AR5KOSW1187FB35FF4",
        )];
        let index = SongIndex::build(&songs);

        let hit = index.resolve(Some("Setanta matilda"), Some(269.58321)).unwrap();
        assert_eq!(hit.song_id, "SOZCTXZ12AB0182364");
        assert!(index.resolve(Some("Setanta matilda"), Some(269.0)).is_none());
        assert!(index.resolve(Some("Setanta Matilda"), Some(269.58321)).is_none());
        assert!(index.resolve(None, Some(269.58321)).is_none());
        assert!(index.resolve(Some("Setanta matilda"), None).is_none());
    }

    #[test]
    fn ambiguous_key_picks_smallest_song_id() {
        let songs = vec![
            song("SOB", "Intro", 60.0, "AR2"),
            song("SOA", "Intro", 60.0, "AR1"),
            song("SOC", "Intro", 60.0, "AR3"),
        ];
        let index = SongIndex::build(&songs);
        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve(Some("Intro"), Some(60.0)).unwrap().song_id, "SOA");

        let reversed: Vec<SongRecord> = songs.into_iter().rev().collect();
        let index = SongIndex::build(&reversed);
        assert_eq!(index.resolve(Some("Intro"), Some(60.0)).unwrap().song_id, "SOA");
    }

    #[test]
    fn nan_duration_never_matches() {
        let songs = vec![song("SOA", "Silence", f64::NAN, "AR1")];
        let index = SongIndex::build(&songs);
        assert!(index.is_empty());
        assert!(index.resolve(Some("Silence"), Some(f64::NAN)).is_none());
    }

    #[test]
    fn every_event_becomes_a_songplay() {
        let songs = vec![song(
            "SOZCTXZ12AB0182364",
            "Setanta matilda",
            269.58321,
            "AR5KOSW1187FB35FF4",
        )];
        let index = SongIndex::build(&songs);
        let events = vec![
            event("Setanta matilda", 269.58321, 1541121934796),
            event("Unknown Track", 123.0, 1541121934796),
            event("Setanta matilda", 269.58321, 1543622400000),
        ];
        let ids = SongplayIdGenerator::new();

        let plays = resolve_songplays(&events, &instants(&events), &index, &ids);
        assert_eq!(plays.len(), 3);

        assert_eq!(plays[0].song_id.as_deref(), Some("SOZCTXZ12AB0182364"));
        assert_eq!(plays[0].artist_id.as_deref(), Some("AR5KOSW1187FB35FF4"));
        assert_eq!(plays[0].start_time, Some(1541121934796000));
        assert_eq!((plays[0].year, plays[0].month), (Some(2018), Some(11)));

        assert_eq!(plays[1].song_id, None);
        assert_eq!(plays[1].artist_id, None);
        assert_eq!(plays[1].session_id, Some(9));

        // 2018-12-01T00:00:00Z
        assert_eq!((plays[2].year, plays[2].month), (Some(2018), Some(12)));

        let play_ids: Vec<i64> = plays.iter().map(|p| p.songplay_id).collect();
        assert!(play_ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn missing_timestamp_keeps_the_play() {
        let index = SongIndex::build(&[]);
        let mut e = event("Anything", 1.0, 0);
        e.ts = None;
        let events = vec![e];
        let plays = resolve_songplays(&events, &instants(&events), &index, &SongplayIdGenerator::new());
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].start_time, None);
        assert_eq!(plays[0].year, None);
    }

    #[test]
    fn ids_keep_increasing_across_reservations() {
        let ids = SongplayIdGenerator::starting_at(100);
        let first = ids.reserve(3);
        let second = ids.reserve(2);
        assert_eq!(first, 100..103);
        assert_eq!(second, 103..105);
        assert!(ids.reserve(0).is_empty());
    }
}
