use serde::{Deserialize, Deserializer};

/// One song metadata record from the catalog dump.
#[derive(Clone, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct RawSong {
    pub num_songs: Option<i64>,
    pub artist_id: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
    pub artist_location: Option<String>,
    pub artist_name: Option<String>,
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub year: Option<i32>,
}

/// Page value of the events that represent an actual song play.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// One user activity record from the session logs.
#[derive(Clone, Deserialize, Debug, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LogEvent {
    pub artist: Option<String>,
    pub auth: Option<String>,
    pub first_name: Option<String>,
    pub gender: Option<String>,
    pub item_in_session: Option<i64>,
    pub last_name: Option<String>,
    pub length: Option<f64>,
    pub level: Option<String>,
    pub location: Option<String>,
    pub method: Option<String>,
    pub page: Option<String>,
    pub registration: Option<f64>,
    pub session_id: Option<i64>,
    pub song: Option<String>,
    pub status: Option<i64>,
    /// Epoch milliseconds.
    pub ts: Option<i64>,
    pub user_agent: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
}

impl LogEvent {
    pub fn is_song_play(&self) -> bool {
        self.page.as_deref() == Some(NEXT_SONG_PAGE)
    }
}

/// Accepts `"42"`, `42` or `null`; numbers are kept in their textual form.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}
