//! Time-grid generation -- the discrete universe of slot start times.
//!
//! Pure and deterministic: the same granularity always yields the same grid.
//! Each slot carries a 12-hour display label for the UI; all computation uses
//! the underlying `NaiveTime`.

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// One grid position: a time of day plus its 12-hour display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlot {
    pub time: NaiveTime,
    pub label: String,
}

/// Format a time of day in 12-hour display form (e.g., "1:30 PM").
pub fn twelve_hour_label(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn check_granularity(granularity_minutes: u32) -> Result<()> {
    if granularity_minutes == 0 || MINUTES_PER_DAY % granularity_minutes != 0 {
        return Err(EngineError::InvalidGranularity(granularity_minutes));
    }
    Ok(())
}

fn time_at(minutes_from_midnight: u32) -> NaiveTime {
    // Stays within the day for every caller, so the wrapping Add is exact.
    NaiveTime::MIN + Duration::minutes(i64::from(minutes_from_midnight))
}

fn minutes_of(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Generate every slot start time across a full day at the given granularity.
///
/// Returns exactly `1440 / granularity_minutes` slots, sorted, starting at
/// midnight. The granularity must be positive and evenly divide 1440;
/// otherwise `InvalidGranularity`.
pub fn generate_slots(granularity_minutes: u32) -> Result<Vec<GridSlot>> {
    check_granularity(granularity_minutes)?;

    let slots = (0..MINUTES_PER_DAY)
        .step_by(granularity_minutes as usize)
        .map(|m| {
            let time = time_at(m);
            GridSlot {
                time,
                label: twelve_hour_label(time),
            }
        })
        .collect();

    Ok(slots)
}

/// Grid start times within `[start, end)` at the given granularity.
///
/// The walk begins at `start` itself, so an availability window of
/// 10:00..15:00 at 60 minutes yields 10:00 through 14:00 -- the end boundary
/// is never a slot.
pub fn slots_between(
    start: NaiveTime,
    end: NaiveTime,
    granularity_minutes: u32,
) -> Result<Vec<NaiveTime>> {
    check_granularity(granularity_minutes)?;

    let end_minutes = minutes_of(end);
    let mut times = Vec::new();
    let mut cursor = minutes_of(start);
    while cursor < end_minutes {
        times.push(time_at(cursor));
        cursor += granularity_minutes;
    }

    Ok(times)
}

/// All grid slots usable as an end time for a selection starting at `start`.
///
/// A valid end time sits strictly after `start` by at least
/// `min_duration_slots` grid steps, which rules out zero-length and
/// sub-minimum selections in the availability editor.
pub fn valid_end_times(
    start: NaiveTime,
    min_duration_slots: u32,
    granularity_minutes: u32,
) -> Result<Vec<GridSlot>> {
    check_granularity(granularity_minutes)?;

    let threshold = minutes_of(start) + min_duration_slots.max(1) * granularity_minutes;

    Ok(generate_slots(granularity_minutes)?
        .into_iter()
        .filter(|slot| minutes_of(slot.time) >= threshold)
        .collect())
}
