//! Shared constants for end-to-end tests
//!
//! When the sample catalog or activity log changes, update only this file.

// ============================================================================
// Catalog
// ============================================================================

pub const MATCHED_SONG_ID: &str = "SOZCTXZ12AB0182364";
pub const MATCHED_ARTIST_ID: &str = "AR5KOSW1187FB35FF4";

pub const Y2K_SONG_ID: &str = "SOY2K12AB0100001";
pub const Y2K_ARTIST_ID: &str = "ARTIST1";

pub const SONG_MATCHED: &str = r#"{"num_songs": 1, "artist_id": "AR5KOSW1187FB35FF4", "artist_latitude": 49.80388, "artist_longitude": 15.47491, "artist_location": "Dubai UAE", "artist_name": "Elena", "song_id": "SOZCTXZ12AB0182364", "title": "Setanta matilda", "duration": 269.58321, "year": 0}"#;

pub const SONG_Y2K: &str = r#"{"num_songs": 1, "artist_id": "ARTIST1", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "Artist One", "song_id": "SOY2K12AB0100001", "title": "Year Two Thousand", "duration": 180.0, "year": 2000}"#;

pub const SONG_WITHOUT_IDS: &str = r#"{"num_songs": 1, "artist_id": null, "artist_latitude": null, "artist_longitude": null, "artist_location": null, "artist_name": "Nobody", "song_id": null, "title": "Ghost Track", "duration": 99.0, "year": 1999}"#;

/// (relative key, content) of every song file; the Y2K song appears twice.
pub const SONG_FILES: &[(&str, &str)] = &[
    ("song_data/A/A/A/TRAAAAW128F429D538.json", SONG_MATCHED),
    ("song_data/A/A/B/TRAABCL128F4286650.json", SONG_Y2K),
    ("song_data/A/B/A/TRABACN128F425B784.json", SONG_Y2K),
    ("song_data/A/B/C/TRABCEI128F424C983.json", SONG_WITHOUT_IDS),
];

// ============================================================================
// Activity log
// ============================================================================

/// 2018-11-02T01:25:34.796Z
pub const MATCHED_PLAY_TS: i64 = 1541121934796;
/// 2018-11-02T01:30:41.796Z
pub const LATER_PLAY_TS: i64 = 1541122241796;

pub const PAYING_USER_ID: &str = "15";
pub const FREE_USER_ID: &str = "26";

pub const LOG_FILE_KEY: &str = "log_data/2018/11/2018-11-02-events.json";

/// Three song plays among five events: one matched, one unknown, one Y2K play.
pub const LOG_EVENTS: &str = concat!(
    r#"{"artist":"Elena","auth":"Logged In","firstName":"Lily","gender":"F","itemInSession":0,"lastName":"Koch","length":269.58321,"level":"paid","location":"Chicago-Naperville-Elgin, IL-IN-WI","method":"PUT","page":"NextSong","registration":1541048010796.0,"sessionId":818,"song":"Setanta matilda","status":200,"ts":1541121934796,"userAgent":"Mozilla/5.0","userId":"15"}"#,
    "\n",
    r#"{"artist":null,"auth":"Logged In","firstName":"Lily","gender":"F","itemInSession":1,"lastName":"Koch","length":null,"level":"paid","location":"Chicago-Naperville-Elgin, IL-IN-WI","method":"GET","page":"Home","registration":1541048010796.0,"sessionId":818,"song":null,"status":200,"ts":1541121954796,"userAgent":"Mozilla/5.0","userId":"15"}"#,
    "\n",
    r#"{"artist":"Nobody","auth":"Logged In","firstName":"Ryan","gender":"M","itemInSession":0,"lastName":"Smith","length":123.0,"level":"free","location":"San Jose-Sunnyvale-Santa Clara, CA","method":"PUT","page":"NextSong","registration":1541016707796.0,"sessionId":583,"song":"Unknown Track","status":200,"ts":1541122241796,"userAgent":"Mozilla/5.0 (X11)","userId":"26"}"#,
    "\n",
    r#"{"artist":"Artist One","auth":"Logged In","firstName":"Lily","gender":"F","itemInSession":2,"lastName":"Koch","length":180.0,"level":"paid","location":"Chicago-Naperville-Elgin, IL-IN-WI","method":"PUT","page":"NextSong","registration":1541048010796.0,"sessionId":818,"song":"Year Two Thousand","status":200,"ts":1541122241796,"userAgent":"Mozilla/5.0","userId":"15"}"#,
    "\n",
    r#"{"artist":null,"auth":"Logged Out","firstName":null,"gender":null,"itemInSession":3,"lastName":null,"length":null,"level":"paid","location":null,"method":"GET","page":"Home","registration":null,"sessionId":818,"song":null,"status":200,"ts":1541122300796,"userAgent":null,"userId":""}"#,
    "\n"
);

pub const SONG_PLAY_COUNT: usize = 3;
