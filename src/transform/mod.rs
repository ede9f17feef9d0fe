//! Cleaning and projection of raw records into star-schema rows.

mod songs;
mod time;
mod users;

pub use songs::{transform_song_records, SongTables};
pub use time::{derive_time_rows, time_record_from_epoch_millis};
pub use users::{clean_events, project_users, CleanedEvents};

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Why a raw record was left out of the load.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DropReason {
    #[error("missing song_id")]
    MissingSongId,
    #[error("missing artist_id")]
    MissingArtistId,
    #[error("missing userId")]
    MissingUserId,
    #[error("missing or invalid ts")]
    MissingTimestamp,
}

/// Per-reason count of dropped records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropCounts(BTreeMap<DropReason, usize>);

impl DropCounts {
    pub fn record(&mut self, reason: DropReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    pub fn get(&self, reason: DropReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl fmt::Display for DropCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(reason, count)| format!("{} {}", count, reason))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
