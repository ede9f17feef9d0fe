//! Batch driver: collects data files, transforms them and loads the rows.
//!
//! Loading is best-effort. A failing row write is logged together with the
//! row, recorded as skipped, and the rest of the table keeps loading.

use crate::collector::{collect_records, CollectError};
use crate::models::{RawEventRecord, RawSongRecord};
use crate::resolver::{resolve_songplays, Resolution};
use crate::store::StarSchemaStore;
use crate::transform::{
    clean_events, derive_time_rows, project_users, transform_song_records, DropCounts,
};
use anyhow::Result;
use std::fmt::{self, Debug};
use std::path::Path;
use tracing::{error, info};

/// Result of a single row write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// A row was inserted or updated.
    Written,
    /// The conflict policy kept the existing row.
    Unchanged,
    /// The write failed; the rendered error.
    Skipped(String),
}

impl RowOutcome {
    fn from_changed(result: Result<usize>) -> Self {
        match result {
            Ok(0) => RowOutcome::Unchanged,
            Ok(_) => RowOutcome::Written,
            Err(e) => RowOutcome::Skipped(format!("{:#}", e)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoadSummary {
    pub table: &'static str,
    pub written: usize,
    pub unchanged: usize,
    pub skipped: Vec<SkippedRow>,
}

impl TableLoadSummary {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            written: 0,
            unchanged: 0,
            skipped: Vec::new(),
        }
    }

    pub fn attempted(&self) -> usize {
        self.written + self.unchanged + self.skipped.len()
    }

    fn record<T: Debug>(&mut self, row: &T, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Written => self.written += 1,
            RowOutcome::Unchanged => self.unchanged += 1,
            RowOutcome::Skipped(reason) => {
                error!("Error inserting {} row {:?}: {}", self.table, row, reason);
                self.skipped.push(SkippedRow {
                    row: format!("{:?}", row),
                    reason,
                });
            }
        }
    }
}

impl fmt::Display for TableLoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} unchanged, {} skipped",
            self.written,
            self.unchanged,
            self.skipped.len()
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub matched: usize,
    pub unmatched: usize,
    pub lookup_failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongLoadSummary {
    pub artists: TableLoadSummary,
    pub songs: TableLoadSummary,
    pub dropped: DropCounts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLoadSummary {
    pub time: TableLoadSummary,
    pub users: TableLoadSummary,
    pub songplays: TableLoadSummary,
    pub resolution: ResolutionStats,
    /// Events left out of the user and songplay loads.
    pub dropped: DropCounts,
    /// Events left out of the time load.
    pub time_dropped: DropCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Song,
    Log,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadSummary {
    Song(SongLoadSummary),
    Log(LogLoadSummary),
}

fn load_rows<T: Debug>(
    table: &'static str,
    rows: &[T],
    mut write: impl FnMut(&T) -> RowOutcome,
) -> TableLoadSummary {
    let mut summary = TableLoadSummary::new(table);
    for row in rows {
        let outcome = write(row);
        summary.record(row, outcome);
    }
    info!("{} ok: {}", table, summary);
    summary
}

/// Loads song-data records: artists first, then the songs referencing them.
pub fn process_song_records<S: StarSchemaStore + ?Sized>(
    store: &S,
    records: Vec<RawSongRecord>,
) -> SongLoadSummary {
    let tables = transform_song_records(records);
    if tables.dropped.total() > 0 {
        info!("Dropped song records: {}", tables.dropped);
    }

    let artists = load_rows("artists", &tables.artists, |artist| {
        RowOutcome::from_changed(store.upsert_artist_if_absent(artist))
    });
    let songs = load_rows("songs", &tables.songs, |song| {
        RowOutcome::from_changed(store.insert_song(song))
    });

    SongLoadSummary {
        artists,
        songs,
        dropped: tables.dropped,
    }
}

/// Loads event-log records: time rows, then users, then one songplay per
/// cleaned event.
pub fn process_log_records<S: StarSchemaStore + ?Sized>(
    store: &S,
    records: Vec<RawEventRecord>,
) -> LogLoadSummary {
    let (time_rows, time_dropped) = derive_time_rows(&records);
    let time = load_rows("time", &time_rows, |row| {
        RowOutcome::from_changed(store.upsert_time_if_absent(row))
    });

    let cleaned = clean_events(records);
    if cleaned.dropped.total() > 0 {
        info!("Dropped log records: {}", cleaned.dropped);
    }

    let user_rows = project_users(&cleaned.events);
    let users = load_rows("users", &user_rows, |user| {
        RowOutcome::from_changed(store.upsert_user(user))
    });

    let resolved = resolve_songplays(store, &cleaned.events);
    let mut resolution = ResolutionStats::default();
    for songplay in &resolved {
        match songplay.resolution {
            Resolution::Matched(_) => resolution.matched += 1,
            Resolution::Unmatched => resolution.unmatched += 1,
            Resolution::LookupFailed(_) => resolution.lookup_failed += 1,
        }
    }
    let facts: Vec<_> = resolved.into_iter().map(|r| r.fact).collect();
    let songplays = load_rows("songplay", &facts, |fact| match store.insert_songplay(fact) {
        Ok(_) => RowOutcome::Written,
        Err(e) => RowOutcome::Skipped(format!("{:#}", e)),
    });
    info!(
        "songplay resolution: {} matched, {} unmatched, {} lookup errors",
        resolution.matched, resolution.unmatched, resolution.lookup_failed
    );

    LogLoadSummary {
        time,
        users,
        songplays,
        resolution,
        dropped: cleaned.dropped,
        time_dropped,
    }
}

/// Collects every `extension` file under `root` and loads it as `kind` data.
///
/// A file that fails to parse aborts before anything is written.
pub fn process_data<S: StarSchemaStore + ?Sized>(
    store: &S,
    root: &Path,
    extension: &str,
    kind: DataKind,
) -> Result<LoadSummary, CollectError> {
    let summary = match kind {
        DataKind::Song => {
            let records = collect_records::<RawSongRecord>(root, extension)?;
            LoadSummary::Song(process_song_records(store, records))
        }
        DataKind::Log => {
            let records = collect_records::<RawEventRecord>(root, extension)?;
            LoadSummary::Log(process_log_records(store, records))
        }
    };
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FaultInjectingStore, SqliteStarSchemaStore};
    use crate::transform::DropReason;
    use serde_json::json;

    fn song(song_id: &str, artist_id: &str, title: &str, artist_name: &str) -> RawSongRecord {
        RawSongRecord {
            song_id: Some(song_id.to_string()),
            title: Some(title.to_string()),
            artist_id: Some(artist_id.to_string()),
            year: Some(json!(0)),
            duration: Some(json!(244.3)),
            artist_name: Some(artist_name.to_string()),
            artist_location: Some("Dubai UAE".to_string()),
            artist_latitude: None,
            artist_longitude: None,
        }
    }

    fn play(user_id: serde_json::Value, ts: i64, song: &str, artist: &str) -> RawEventRecord {
        RawEventRecord {
            ts: Some(json!(ts)),
            user_id: Some(user_id),
            first_name: Some("Kaylee".to_string()),
            last_name: Some("Summers".to_string()),
            gender: Some("F".to_string()),
            level: Some("free".to_string()),
            session_id: Some(json!(139)),
            location: Some("Phoenix-Mesa-Scottsdale, AZ".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            artist: Some(artist.to_string()),
            song: Some(song.to_string()),
            length: Some(json!(244.3)),
        }
    }

    fn loaded_store() -> SqliteStarSchemaStore {
        let store = SqliteStarSchemaStore::open_in_memory().unwrap();
        process_song_records(
            &store,
            vec![song(
                "SOSITYK12A8C13765E",
                "ARUKJUP12086C1411F",
                "Mother of All...",
                "Elena",
            )],
        );
        store
    }

    #[test]
    fn song_load_shares_artist_rows() {
        let store = SqliteStarSchemaStore::open_in_memory().unwrap();

        let summary = process_song_records(
            &store,
            vec![
                song("S1", "A1", "First", "Elena"),
                song("S2", "A1", "Second", "Elena"),
                RawSongRecord::default(),
            ],
        );

        assert_eq!(summary.artists.written, 1);
        assert_eq!(summary.artists.unchanged, 1);
        assert_eq!(summary.songs.written, 2);
        assert_eq!(summary.dropped.get(DropReason::MissingSongId), 1);
        let counts = store.table_counts().unwrap();
        assert_eq!(counts.artists, 1);
        assert_eq!(counts.songs, 2);
    }

    #[test]
    fn duplicate_song_is_skipped_and_batch_continues() {
        let store = SqliteStarSchemaStore::open_in_memory().unwrap();

        let summary = process_song_records(
            &store,
            vec![
                song("S1", "A1", "First", "Elena"),
                song("S1", "A1", "Again", "Elena"),
                song("S3", "A1", "Third", "Elena"),
            ],
        );

        assert_eq!(summary.songs.written, 2);
        assert_eq!(summary.songs.skipped.len(), 1);
        assert!(summary.songs.skipped[0].row.contains("Again"));
        assert!(summary.songs.skipped[0].reason.contains("S1"));
        assert_eq!(summary.songs.attempted(), 3);
    }

    #[test]
    fn failed_song_write_leaves_its_artist_loaded() {
        let store = FaultInjectingStore::new(SqliteStarSchemaStore::open_in_memory().unwrap())
            .fail_song("S1");

        let summary = process_song_records(
            &store,
            vec![
                song("S1", "A1", "First", "Elena"),
                song("S2", "A2", "Second", "Brel"),
            ],
        );

        assert_eq!(summary.artists.written, 2);
        assert_eq!(summary.songs.written, 1);
        assert_eq!(summary.songs.skipped.len(), 1);
        let counts = store.inner().table_counts().unwrap();
        assert_eq!(counts.artists, 2);
        assert_eq!(counts.songs, 1);
    }

    #[test]
    fn log_load_writes_one_fact_per_clean_event() {
        let store = loaded_store();

        let summary = process_log_records(
            &store,
            vec![
                play(json!("8"), 1541105830796, "Mother of All...", "Elena"),
                play(json!("8"), 1541106106796, "Unknown", "Nobody"),
                play(json!(""), 1541106496796, "Mother of All...", "Elena"),
            ],
        );

        assert_eq!(summary.songplays.written, 2);
        assert_eq!(summary.resolution.matched, 1);
        assert_eq!(summary.resolution.unmatched, 1);
        assert_eq!(summary.dropped.get(DropReason::MissingUserId), 1);
        // The anonymous event still gets its time row.
        assert_eq!(summary.time.written, 3);
        assert_eq!(summary.users.written, 2);

        let counts = store.table_counts().unwrap();
        assert_eq!(counts.users, 1);
        assert_eq!(counts.time, 3);
        assert_eq!(counts.songplay, 2);
    }

    #[test]
    fn lookup_failure_writes_fact_with_null_keys() {
        let store = FaultInjectingStore::new(loaded_store()).fail_lookups();

        let summary = process_log_records(
            &store,
            vec![play(json!(8), 1541105830796, "Mother of All...", "Elena")],
        );

        assert_eq!(summary.resolution.lookup_failed, 1);
        assert_eq!(summary.songplays.written, 1);
        let rows = store.inner().get_songplays().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.song_id, None);
        assert_eq!(rows[0].1.artist_id, None);
    }

    #[test]
    fn failed_user_write_skips_only_that_user() {
        let store = FaultInjectingStore::new(loaded_store()).fail_user(8);

        let summary = process_log_records(
            &store,
            vec![
                play(json!(8), 1541105830796, "Mother of All...", "Elena"),
                play(json!(26), 1541106106796, "Mother of All...", "Elena"),
            ],
        );

        assert_eq!(summary.users.written, 1);
        assert_eq!(summary.users.skipped.len(), 1);
        // Without its user row the first fact violates the foreign key.
        assert_eq!(summary.songplays.written, 1);
        assert_eq!(summary.songplays.skipped.len(), 1);
    }

    #[test]
    fn process_data_reports_parse_errors() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bad.json"), "{not json}\n").unwrap();
        let store = SqliteStarSchemaStore::open_in_memory().unwrap();

        let result = process_data(&store, temp_dir.path(), "json", DataKind::Song);

        assert!(matches!(result, Err(CollectError::Parse { line: 1, .. })));
        assert_eq!(store.table_counts().unwrap().songs, 0);
    }
}
