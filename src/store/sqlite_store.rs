//! SQLite-backed star schema store.

use super::schema::{
    ARTISTS_TABLE, SONGPLAY_TABLE, SONGS_TABLE, STAR_SCHEMA_VERSIONED_SCHEMAS, TIME_TABLE,
    USERS_TABLE,
};
use super::trait_def::{SongMatch, StarSchemaStore};
use crate::models::{ArtistRecord, Level, SongRecord, SongplayFact, TimeRecord, UserRecord};
use crate::sqlite_persistence::{VersionedSchema, BASE_DB_VERSION};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

/// Row counts of the five star schema tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub time: usize,
    pub songplay: usize,
}

/// Owns the single connection of a load run; it is closed when the store drops.
pub struct SqliteStarSchemaStore {
    conn: Connection,
}

fn latest_schema() -> Result<&'static VersionedSchema> {
    STAR_SCHEMA_VERSIONED_SCHEMAS
        .last()
        .context("No star schema version defined")
}

fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
            | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
            | rusqlite::OpenFlags::SQLITE_OPEN_URI
            | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(conn)
}

/// Creates the schema on an empty database, validates it otherwise.
fn prepare_schema(conn: &Connection) -> Result<()> {
    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        let latest = latest_schema()?;
        info!("Creating star schema at version {}", latest.version);
        return latest.create(conn);
    }

    let db_version: usize = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .context("Failed to read database version")?;
    let version = db_version.checked_sub(BASE_DB_VERSION).with_context(|| {
        format!(
            "Database version {} was not created by this tool, run create-tables first",
            db_version
        )
    })?;
    let schema = STAR_SCHEMA_VERSIONED_SCHEMAS
        .get(version)
        .with_context(|| format!("Database version {} is too new", version))?;
    schema
        .validate(conn)
        .context("Star schema validation failed")
}

fn parse_level(raw: Option<String>) -> Option<Level> {
    raw.as_deref().and_then(Level::parse)
}

impl SqliteStarSchemaStore {
    /// Opens the database at `db_path`, creating the schema if it is empty.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_connection(db_path.as_ref())?;
        prepare_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", true)?;
        prepare_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Drops the star schema tables at `db_path` and creates them again.
    pub fn bootstrap<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_connection(db_path.as_ref())?;
        let latest = latest_schema()?;
        info!("Dropping star schema tables");
        latest.drop_all(&conn)?;
        info!("Creating star schema at version {}", latest.version);
        latest.create(&conn)?;
        Ok(Self { conn })
    }

    pub fn table_counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<usize> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
                .with_context(|| format!("Failed to count rows of {}", table))
        };
        Ok(TableCounts {
            songs: count(SONGS_TABLE.name)?,
            artists: count(ARTISTS_TABLE.name)?,
            users: count(USERS_TABLE.name)?,
            time: count(TIME_TABLE.name)?,
            songplay: count(SONGPLAY_TABLE.name)?,
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>> {
        match self.conn.query_row(
            "SELECT user_id, first_name, last_name, gender, level FROM users WHERE user_id = ?1",
            params![user_id],
            |r| {
                Ok(UserRecord {
                    user_id: r.get(0)?,
                    first_name: r.get(1)?,
                    last_name: r.get(2)?,
                    gender: r.get(3)?,
                    level: parse_level(r.get(4)?),
                })
            },
        ) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_artist(&self, artist_id: &str) -> Result<Option<ArtistRecord>> {
        match self.conn.query_row(
            "SELECT artist_id, name, location, latitude, longitude FROM artists WHERE artist_id = ?1",
            params![artist_id],
            |r| {
                Ok(ArtistRecord {
                    artist_id: r.get(0)?,
                    name: r.get(1)?,
                    location: r.get(2)?,
                    latitude: r.get(3)?,
                    longitude: r.get(4)?,
                })
            },
        ) {
            Ok(artist) => Ok(Some(artist)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_time(&self, start_time: NaiveDateTime) -> Result<Option<TimeRecord>> {
        match self.conn.query_row(
            "SELECT start_time, hour, day, week, month, year, weekday FROM time WHERE start_time = ?1",
            params![start_time],
            |r| {
                Ok(TimeRecord {
                    start_time: r.get(0)?,
                    hour: r.get(1)?,
                    day: r.get(2)?,
                    week: r.get(3)?,
                    month: r.get(4)?,
                    year: r.get(5)?,
                    weekday: r.get(6)?,
                })
            },
        ) {
            Ok(time) => Ok(Some(time)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All fact rows ordered by songplay id.
    pub fn get_songplays(&self) -> Result<Vec<(i64, SongplayFact)>> {
        let mut stmt = self.conn.prepare(
            "SELECT songplay_id, start_time, user_id, level, song_id, artist_id, session_id, location, user_agent
             FROM songplay
             ORDER BY songplay_id ASC",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok((
                    r.get(0)?,
                    SongplayFact {
                        start_time: r.get(1)?,
                        user_id: r.get(2)?,
                        level: parse_level(r.get(3)?),
                        song_id: r.get(4)?,
                        artist_id: r.get(5)?,
                        session_id: r.get(6)?,
                        location: r.get(7)?,
                        user_agent: r.get(8)?,
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl StarSchemaStore for SqliteStarSchemaStore {
    fn upsert_user(&self, user: &UserRecord) -> Result<usize> {
        let changed = self
            .conn
            .prepare_cached(
                "INSERT INTO users (user_id, first_name, last_name, gender, level)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id) DO UPDATE SET level = COALESCE(excluded.level, users.level)",
            )?
            .execute(params![
                user.user_id,
                user.first_name,
                user.last_name,
                user.gender,
                user.level.map(|l| l.as_str()),
            ])
            .with_context(|| format!("Failed to upsert user {}", user.user_id))?;
        Ok(changed)
    }

    fn insert_song(&self, song: &SongRecord) -> Result<usize> {
        let changed = self
            .conn
            .prepare_cached(
                "INSERT INTO songs (song_id, title, artist_id, year, duration)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![
                song.song_id,
                song.title,
                song.artist_id,
                song.year,
                song.duration,
            ])
            .with_context(|| format!("Failed to insert song {}", song.song_id))?;
        Ok(changed)
    }

    fn upsert_artist_if_absent(&self, artist: &ArtistRecord) -> Result<usize> {
        let changed = self
            .conn
            .prepare_cached(
                "INSERT INTO artists (artist_id, name, location, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (artist_id) DO NOTHING",
            )?
            .execute(params![
                artist.artist_id,
                artist.name,
                artist.location,
                artist.latitude,
                artist.longitude,
            ])
            .with_context(|| format!("Failed to insert artist {}", artist.artist_id))?;
        Ok(changed)
    }

    fn upsert_time_if_absent(&self, time: &TimeRecord) -> Result<usize> {
        let changed = self
            .conn
            .prepare_cached(
                "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (start_time) DO NOTHING",
            )?
            .execute(params![
                time.start_time,
                time.hour,
                time.day,
                time.week,
                time.month,
                time.year,
                time.weekday,
            ])
            .with_context(|| format!("Failed to insert time {}", time.start_time))?;
        Ok(changed)
    }

    fn lookup_song(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongMatch>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT s.song_id, a.artist_id
             FROM songs s
             JOIN artists a ON s.artist_id = a.artist_id
             WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
             LIMIT 1",
        )?;
        match stmt.query_row(params![title, artist_name, duration], |r| {
            Ok(SongMatch {
                song_id: r.get(0)?,
                artist_id: r.get(1)?,
            })
        }) {
            Ok(found) => Ok(Some(found)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Song lookup failed"),
        }
    }

    fn insert_songplay(&self, songplay: &SongplayFact) -> Result<i64> {
        self.conn
            .prepare_cached(
                "INSERT INTO songplay (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?
            .execute(params![
                songplay.start_time,
                songplay.user_id,
                songplay.level.map(|l| l.as_str()),
                songplay.song_id,
                songplay.artist_id,
                songplay.session_id,
                songplay.location,
                songplay.user_agent,
            ])
            .context("Failed to insert songplay")?;
        Ok(self.conn.last_insert_rowid())
    }
}
