use super::{DropCounts, DropReason};
use crate::models::{value_as_i64, RawEventRecord, TimeRecord};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

fn naive_from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

pub(crate) fn event_start_time(event: &RawEventRecord) -> Option<NaiveDateTime> {
    event
        .ts
        .as_ref()
        .and_then(value_as_i64)
        .and_then(naive_from_epoch_millis)
}

fn time_record_at(start_time: NaiveDateTime) -> TimeRecord {
    TimeRecord {
        start_time,
        hour: start_time.hour(),
        day: start_time.day(),
        week: start_time.iso_week().week(),
        month: start_time.month(),
        year: start_time.year(),
        weekday: start_time.weekday().num_days_from_monday(),
    }
}

/// Expands a millisecond epoch into its calendar attributes (UTC).
pub fn time_record_from_epoch_millis(millis: i64) -> Option<TimeRecord> {
    naive_from_epoch_millis(millis).map(time_record_at)
}

/// One time row per event, duplicates included.
///
/// Runs over the raw events, so plays from anonymous sessions still get a
/// time row. Events without a usable `ts` are counted and skipped.
pub fn derive_time_rows(events: &[RawEventRecord]) -> (Vec<TimeRecord>, DropCounts) {
    let mut rows = Vec::with_capacity(events.len());
    let mut dropped = DropCounts::default();
    for event in events {
        match event_start_time(event) {
            Some(start_time) => rows.push(time_record_at(start_time)),
            None => dropped.record(DropReason::MissingTimestamp),
        }
    }
    (rows, dropped)
}
