//! Output tables of the analytical schema.
//!
//! `songplays` is the fact table; `songs`, `artists`, `users` and `time` are
//! its dimensions.

mod artists;
mod songplays;
mod songs;
mod time;
mod users;

pub use artists::ArtistRecord;
pub use songplays::SongplayRecord;
pub use songs::SongRecord;
pub use time::{EventInstant, TimeRecord};
pub use users::UserRecord;

use std::hash::Hash;

/// Exact-row identity used by `drop_duplicates`.
pub trait RowIdentity {
    type Key: Hash + Eq;

    fn row_key(&self) -> Self::Key;
}

/// Hashable form of a float column: `-0.0` equals `0.0` and all NaNs are equal.
pub fn float_key(value: Option<f64>) -> Option<u64> {
    value.map(|v| {
        if v.is_nan() {
            f64::NAN.to_bits()
        } else if v == 0.0 {
            0.0f64.to_bits()
        } else {
            v.to_bits()
        }
    })
}
