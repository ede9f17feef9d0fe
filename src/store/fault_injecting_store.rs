//! Store wrapper that fails selected operations.
//!
//! Delegates to an inner store and turns chosen calls into errors, so the
//! skip and fallback paths of a load run can be driven deterministically.

use super::trait_def::{SongMatch, StarSchemaStore};
use crate::models::{ArtistRecord, SongRecord, SongplayFact, TimeRecord, UserRecord};
use anyhow::{bail, Result};
use std::collections::HashSet;

pub struct FaultInjectingStore<S> {
    inner: S,
    failing_lookups: bool,
    failing_song_ids: HashSet<String>,
    failing_user_ids: HashSet<i64>,
}

impl<S: StarSchemaStore> FaultInjectingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_lookups: false,
            failing_song_ids: HashSet::new(),
            failing_user_ids: HashSet::new(),
        }
    }

    /// Every `lookup_song` call returns an error.
    pub fn fail_lookups(mut self) -> Self {
        self.failing_lookups = true;
        self
    }

    /// `insert_song` fails for this song id.
    pub fn fail_song(mut self, song_id: &str) -> Self {
        self.failing_song_ids.insert(song_id.to_string());
        self
    }

    /// `upsert_user` fails for this user id.
    pub fn fail_user(mut self, user_id: i64) -> Self {
        self.failing_user_ids.insert(user_id);
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: StarSchemaStore> StarSchemaStore for FaultInjectingStore<S> {
    fn upsert_user(&self, user: &UserRecord) -> Result<usize> {
        if self.failing_user_ids.contains(&user.user_id) {
            bail!("Injected failure upserting user {}", user.user_id);
        }
        self.inner.upsert_user(user)
    }

    fn insert_song(&self, song: &SongRecord) -> Result<usize> {
        if self.failing_song_ids.contains(&song.song_id) {
            bail!("Injected failure inserting song {}", song.song_id);
        }
        self.inner.insert_song(song)
    }

    fn upsert_artist_if_absent(&self, artist: &ArtistRecord) -> Result<usize> {
        self.inner.upsert_artist_if_absent(artist)
    }

    fn upsert_time_if_absent(&self, time: &TimeRecord) -> Result<usize> {
        self.inner.upsert_time_if_absent(time)
    }

    fn lookup_song(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongMatch>> {
        if self.failing_lookups {
            bail!("Injected lookup failure for {:?} by {:?}", title, artist_name);
        }
        self.inner.lookup_song(title, artist_name, duration)
    }

    fn insert_songplay(&self, songplay: &SongplayFact) -> Result<i64> {
        self.inner.insert_songplay(songplay)
    }
}
