//! StarSchemaStore trait definition.
//!
//! The load pipeline only talks to the store through this trait, so any
//! relational backend can sit behind it.

use crate::models::{ArtistRecord, SongRecord, SongplayFact, TimeRecord, UserRecord};
use anyhow::Result;

/// Keys of a song resolved from a play event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongMatch {
    pub song_id: String,
    pub artist_id: String,
}

pub trait StarSchemaStore {
    /// Inserts a user, or overwrites only the stored level if the user id exists.
    /// A user without a level keeps the stored one.
    /// Returns the number of rows changed.
    fn upsert_user(&self, user: &UserRecord) -> Result<usize>;

    /// Inserts a song. A duplicate song id is an error.
    fn insert_song(&self, song: &SongRecord) -> Result<usize>;

    /// Inserts an artist unless the artist id already exists.
    /// Returns 0 when the existing row was kept.
    fn upsert_artist_if_absent(&self, artist: &ArtistRecord) -> Result<usize>;

    /// Inserts a time row unless the timestamp already exists.
    /// Returns 0 when the existing row was kept.
    fn upsert_time_if_absent(&self, time: &TimeRecord) -> Result<usize>;

    /// Finds the song with the given title, artist name and duration.
    /// Returns None if nothing matches.
    fn lookup_song(&self, title: &str, artist_name: &str, duration: f64)
        -> Result<Option<SongMatch>>;

    /// Inserts a fact row and returns its generated songplay id.
    fn insert_songplay(&self, songplay: &SongplayFact) -> Result<i64>;
}
