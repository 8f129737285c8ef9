//! Availability reconciliation -- from a weekly pattern and existing sessions
//! to the set of actually bookable slots for one concrete date.
//!
//! Two sources feed the result: the raw grid derived from the tutor's weekly
//! window, and any persisted `available`-status sessions an admin pre-seeded
//! outside that pattern. Both are merged and de-duplicated by start time.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::error::Result;
use crate::grid;
use crate::model::{Session, SessionStatus, SlotCandidate, WeeklyAvailability};

/// Compute the free slots for one tutor on one date.
///
/// A weekday with no availability window is a valid "tutor unavailable"
/// outcome and yields an empty list, not an error. Sessions outside the
/// target tutor/date are ignored, so callers may pass an unfiltered list.
///
/// Any session whose status blocks its slot (booked, approved, pending,
/// completed) removes that start time from the grid; cancelled sessions do
/// not. Pre-seeded `available` sessions are merged in even when they fall
/// outside the weekly window.
///
/// Output is time-ordered and duplicate-free. Calling twice with unchanged
/// inputs yields identical results.
pub fn bookable_slots(
    tutor_id: &str,
    availability: &WeeklyAvailability,
    date: NaiveDate,
    sessions: &[Session],
    granularity_minutes: u32,
) -> Result<Vec<SlotCandidate>> {
    let day_sessions: Vec<&Session> = sessions
        .iter()
        .filter(|s| s.tutor_id == tutor_id && s.date == date)
        .collect();

    let occupied: HashSet<NaiveTime> = day_sessions
        .iter()
        .filter(|s| s.status.blocks_slot())
        .map(|s| s.time)
        .collect();

    // BTreeMap keyed by start time gives de-duplication and ordering in one go.
    let mut merged: BTreeMap<NaiveTime, SlotCandidate> = BTreeMap::new();

    if let Some(window) = availability.window_for(date.weekday()) {
        for time in grid::slots_between(window.start, window.end, granularity_minutes)? {
            if !occupied.contains(&time) {
                merged.insert(
                    time,
                    SlotCandidate {
                        tutor_id: tutor_id.to_string(),
                        date,
                        time,
                        duration_minutes: granularity_minutes,
                    },
                );
            }
        }
    }

    // Pre-seeded open slots: admin-created sessions still in `available`.
    for session in &day_sessions {
        if session.status == SessionStatus::Available && !occupied.contains(&session.time) {
            merged
                .entry(session.time)
                .or_insert_with(|| SlotCandidate::from(*session));
        }
    }

    Ok(merged.into_values().collect())
}
