//! Resolution of play events to their song and artist.
//!
//! Every cleaned event produces exactly one fact row. When the song cannot be
//! resolved, whether because nothing matches or because the lookup itself
//! failed, the fact is still produced with null song and artist keys.

use crate::models::{CleanEvent, SongplayFact};
use crate::store::{SongMatch, StarSchemaStore};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Matched(SongMatch),
    /// The lookup ran (or could not run for lack of title, artist or length)
    /// and found nothing.
    Unmatched,
    /// The lookup returned an error, rendered here.
    LookupFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSongplay {
    pub fact: SongplayFact,
    pub resolution: Resolution,
}

fn lookup<S: StarSchemaStore + ?Sized>(store: &S, event: &CleanEvent) -> Resolution {
    let (Some(title), Some(artist), Some(length)) =
        (event.song.as_deref(), event.artist.as_deref(), event.length)
    else {
        return Resolution::Unmatched;
    };

    match store.lookup_song(title, artist, length) {
        Ok(Some(found)) => Resolution::Matched(found),
        Ok(None) => {
            debug!("No song matches {:?} by {:?} ({})", title, artist, length);
            Resolution::Unmatched
        }
        Err(e) => {
            error!(
                "Error selecting song {:?} by {:?} ({}): {:#}",
                title, artist, length, e
            );
            Resolution::LookupFailed(format!("{:#}", e))
        }
    }
}

pub fn resolve_songplay<S: StarSchemaStore + ?Sized>(
    store: &S,
    event: &CleanEvent,
) -> ResolvedSongplay {
    let resolution = lookup(store, event);
    let (song_id, artist_id) = match &resolution {
        Resolution::Matched(found) => (Some(found.song_id.clone()), Some(found.artist_id.clone())),
        Resolution::Unmatched | Resolution::LookupFailed(_) => (None, None),
    };

    ResolvedSongplay {
        fact: SongplayFact {
            start_time: event.start_time,
            user_id: event.user_id,
            level: event.level,
            song_id,
            artist_id,
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
        },
        resolution,
    }
}

/// One resolved fact per event, in event order.
pub fn resolve_songplays<S: StarSchemaStore + ?Sized>(
    store: &S,
    events: &[CleanEvent],
) -> Vec<ResolvedSongplay> {
    events
        .iter()
        .map(|event| resolve_songplay(store, event))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtistRecord, Level, SongRecord};
    use crate::store::{FaultInjectingStore, SqliteStarSchemaStore};
    use crate::transform::time_record_from_epoch_millis;

    fn store_with_song() -> SqliteStarSchemaStore {
        let store = SqliteStarSchemaStore::open_in_memory().unwrap();
        store
            .upsert_artist_if_absent(&ArtistRecord {
                artist_id: "ARUKJUP12086C1411F".to_string(),
                name: Some("Elena".to_string()),
                location: None,
                latitude: None,
                longitude: None,
            })
            .unwrap();
        store
            .insert_song(&SongRecord {
                song_id: "SOSITYK12A8C13765E".to_string(),
                title: Some("Mother of All...".to_string()),
                artist_id: "ARUKJUP12086C1411F".to_string(),
                year: Some(0),
                duration: Some(244.3),
            })
            .unwrap();
        store
    }

    fn play(song: Option<&str>, artist: Option<&str>, length: Option<f64>) -> CleanEvent {
        CleanEvent {
            start_time: time_record_from_epoch_millis(1541105830796)
                .unwrap()
                .start_time,
            user_id: 8,
            first_name: Some("Kaylee".to_string()),
            last_name: Some("Summers".to_string()),
            gender: Some("F".to_string()),
            level: Some(Level::Free),
            session_id: Some(139),
            location: Some("Phoenix-Mesa-Scottsdale, AZ".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            artist: artist.map(str::to_string),
            song: song.map(str::to_string),
            length,
        }
    }

    #[test]
    fn matched_play_carries_song_and_artist_keys() {
        let store = store_with_song();
        let resolved = resolve_songplay(
            &store,
            &play(Some("Mother of All..."), Some("Elena"), Some(244.3)),
        );

        assert!(matches!(resolved.resolution, Resolution::Matched(_)));
        assert_eq!(resolved.fact.song_id.as_deref(), Some("SOSITYK12A8C13765E"));
        assert_eq!(resolved.fact.artist_id.as_deref(), Some("ARUKJUP12086C1411F"));
        assert_eq!(resolved.fact.user_id, 8);
        assert_eq!(resolved.fact.session_id, Some(139));
    }

    #[test]
    fn unmatched_play_keeps_null_keys() {
        let store = store_with_song();
        let resolved = resolve_songplay(
            &store,
            &play(Some("Unknown Song"), Some("Elena"), Some(244.3)),
        );

        assert_eq!(resolved.resolution, Resolution::Unmatched);
        assert_eq!(resolved.fact.song_id, None);
        assert_eq!(resolved.fact.artist_id, None);
    }

    #[test]
    fn play_without_song_fields_is_unmatched_without_lookup() {
        // A failing lookup would report LookupFailed, so reaching Unmatched
        // proves no lookup was issued.
        let store = FaultInjectingStore::new(store_with_song()).fail_lookups();
        let resolved = resolve_songplay(&store, &play(None, None, None));

        assert_eq!(resolved.resolution, Resolution::Unmatched);
    }

    #[test]
    fn lookup_failure_still_produces_a_fact() {
        let store = FaultInjectingStore::new(store_with_song()).fail_lookups();
        let resolved = resolve_songplay(
            &store,
            &play(Some("Mother of All..."), Some("Elena"), Some(244.3)),
        );

        assert!(matches!(resolved.resolution, Resolution::LookupFailed(_)));
        assert_eq!(resolved.fact.song_id, None);
        assert_eq!(resolved.fact.artist_id, None);
    }

    #[test]
    fn every_event_yields_exactly_one_fact() {
        let store = store_with_song();
        let events = vec![
            play(Some("Mother of All..."), Some("Elena"), Some(244.3)),
            play(Some("Nope"), Some("Nobody"), Some(1.0)),
            play(None, None, None),
        ];

        let resolved = resolve_songplays(&store, &events);

        assert_eq!(resolved.len(), events.len());
    }
}
