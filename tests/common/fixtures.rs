//! Test fixture creation for data trees and databases

#![allow(dead_code)]

use super::constants::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory with `song_data/`, `log_data/` and a database path.
/// Everything is removed when the dataset drops.
pub struct TestDataset {
    dir: TempDir,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
}

impl TestDataset {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let song_data = dir.path().join("song_data");
        let log_data = dir.path().join("log_data");
        fs::create_dir_all(&song_data).unwrap();
        fs::create_dir_all(&log_data).unwrap();
        let db_path = dir.path().join("sparkify.db");
        Self {
            dir,
            song_data,
            log_data,
            db_path,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Writes one record per line under `song_data/`.
    pub fn write_song_file(&self, relative: &str, records: &[Value]) -> PathBuf {
        write_ndjson(&self.song_data.join(relative), records)
    }

    /// Writes one record per line under `log_data/`.
    pub fn write_log_file(&self, relative: &str, records: &[Value]) -> PathBuf {
        write_ndjson(&self.log_data.join(relative), records)
    }
}

fn write_ndjson(path: &Path, records: &[Value]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let content: Vec<String> = records.iter().map(Value::to_string).collect();
    fs::write(path, content.join("\n") + "\n").unwrap();
    path.to_path_buf()
}

pub fn song_1_json() -> Value {
    json!({
        "num_songs": 1,
        "artist_id": ARTIST_1_ID,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": ARTIST_1_LOCATION,
        "artist_name": ARTIST_1_NAME,
        "song_id": SONG_1_ID,
        "title": SONG_1_TITLE,
        "duration": SONG_1_DURATION,
        "year": 0
    })
}

fn play_json(ts: i64, user_id: Value, song: &str, artist: &str, length: f64) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": USER_1_FIRST_NAME,
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Summers",
        "length": length,
        "level": "free",
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540344794796.0,
        "sessionId": 139,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "\"Mozilla/5.0 (Windows NT 6.1; WOW64)\"",
        "userId": user_id
    })
}

/// A play of song 1 by user 1; `userId` is a string as in the raw logs.
pub fn matching_play_json(ts: i64) -> Value {
    play_json(
        ts,
        json!(USER_1_ID.to_string()),
        SONG_1_TITLE,
        ARTIST_1_NAME,
        SONG_1_DURATION,
    )
}

/// A play by user 1 of a song that is not in the song data.
pub fn unmatched_play_json(ts: i64) -> Value {
    play_json(
        ts,
        json!(USER_1_ID.to_string()),
        "You Gotta Be",
        "Des'ree",
        246.30812,
    )
}
