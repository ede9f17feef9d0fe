use super::time::event_start_time;
use super::{DropCounts, DropReason};
use crate::models::{
    opt_f64, opt_i64, value_as_i64, CleanEvent, Level, RawEventRecord, UserRecord,
};
use tracing::debug;

#[derive(Debug, Default)]
pub struct CleanedEvents {
    pub events: Vec<CleanEvent>,
    pub dropped: DropCounts,
}

fn clean_event(event: RawEventRecord) -> Result<CleanEvent, DropReason> {
    let user_id = event
        .user_id
        .as_ref()
        .and_then(value_as_i64)
        .ok_or(DropReason::MissingUserId)?;
    let start_time = event_start_time(&event).ok_or(DropReason::MissingTimestamp)?;

    let level = event.level.as_deref().and_then(|raw| {
        let level = Level::parse(raw);
        if level.is_none() {
            debug!("Unknown level {:?} for user {}", raw, user_id);
        }
        level
    });

    Ok(CleanEvent {
        start_time,
        user_id,
        first_name: event.first_name,
        last_name: event.last_name,
        gender: event.gender,
        level,
        session_id: opt_i64(event.session_id.as_ref()),
        location: event.location,
        user_agent: event.user_agent,
        artist: event.artist,
        song: event.song,
        length: opt_f64(event.length.as_ref()),
    })
}

/// Drops events without a user id or a usable timestamp, preserving order.
pub fn clean_events(events: Vec<RawEventRecord>) -> CleanedEvents {
    let mut cleaned = CleanedEvents {
        events: Vec::with_capacity(events.len()),
        dropped: DropCounts::default(),
    };
    for event in events {
        match clean_event(event) {
            Ok(event) => cleaned.events.push(event),
            Err(reason) => cleaned.dropped.record(reason),
        }
    }
    cleaned
}

/// One user row per event, in event order.
///
/// Not deduplicated here: the store keeps one row per user id and the last
/// upserted level wins.
pub fn project_users(events: &[CleanEvent]) -> Vec<UserRecord> {
    events
        .iter()
        .map(|event| UserRecord {
            user_id: event.user_id,
            first_name: event.first_name.clone(),
            last_name: event.last_name.clone(),
            gender: event.gender.clone(),
            level: event.level,
        })
        .collect()
}
