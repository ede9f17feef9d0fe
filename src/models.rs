//! Raw input records and the typed rows of the star schema.
//!
//! Raw records mirror the newline-delimited JSON files one to one and keep
//! every field optional. Rows are what the store persists.

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

/// One line of a song-data file.
///
/// Numeric attributes are kept as JSON values and coerced during the
/// transform; a value of the wrong shape becomes NULL instead of failing the
/// whole file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSongRecord {
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<Value>,
    pub duration: Option<Value>,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<Value>,
    pub artist_longitude: Option<Value>,
}

/// One line of an event-log file.
///
/// Numeric fields are kept as JSON values: the logs carry `ts` and `userId`
/// either as numbers or as strings, with `""` for anonymous sessions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventRecord {
    pub ts: Option<Value>,
    pub user_id: Option<Value>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub session_id: Option<Value>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub artist: Option<String>,
    pub song: Option<String>,
    pub length: Option<Value>,
}

/// Reads an integer out of a number or a numeric string.
///
/// Empty strings and anything that is not an integer count as missing.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}

/// Reads a float out of a number or a numeric string.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Coerces an optional raw field, `None` when absent or of the wrong shape.
pub fn opt_i64(value: Option<&Value>) -> Option<i64> {
    value.and_then(value_as_i64)
}

pub fn opt_f64(value: Option<&Value>) -> Option<f64> {
    value.and_then(value_as_f64)
}

/// Treats `""` the same as an absent value.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Free,
    Paid,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Free => "free",
            Level::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Level> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Level::Free),
            "paid" => Some(Level::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: String,
    pub year: Option<i32>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<Level>,
}

/// Calendar attributes of a play timestamp.
///
/// `week` is the ISO-8601 week number, `weekday` counts from 0 = Monday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRecord {
    pub start_time: NaiveDateTime,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

/// An event that passed the user-id and timestamp checks.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanEvent {
    pub start_time: NaiveDateTime,
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<Level>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub artist: Option<String>,
    pub song: Option<String>,
    pub length: Option<f64>,
}

/// A fact row. `songplay_id` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplayFact {
    pub start_time: NaiveDateTime,
    pub user_id: i64,
    pub level: Option<Level>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}
