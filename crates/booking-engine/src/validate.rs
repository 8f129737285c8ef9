//! Booking-window validation -- the pure decision function behind every
//! booking attempt.
//!
//! Rules apply in a fixed precedence order and short-circuit on the first
//! failure. The function is deterministic and side-effect-free: `now` is a
//! parameter, never read from the clock. Clients may call it for immediate
//! feedback, but that call is advisory only -- the authoritative check is the
//! re-validation inside the orchestrator against freshly fetched state.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BookingConstraints;
use crate::model::{Session, SessionStatus, SlotCandidate};

/// Why a booking attempt was turned down. Expected, user-facing outcomes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    #[error("the slot starts inside the minimum lead window")]
    InsufficientLeadTime,

    #[error("bookings are not accepted on that weekday")]
    ClosedDay,

    #[error("the student already has a session on that date")]
    DailyLimitReached,

    #[error("the slot is no longer available")]
    SlotNoLongerAvailable,
}

/// Resolve a wall-clock instant in `tz` to UTC.
///
/// Ambiguous wall-clock times (DST fall-back) resolve to the earliest
/// instant. Times inside a DST gap do not exist and return `None`.
pub fn wall_clock_to_utc(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decide whether `candidate` may be booked right now.
///
/// * `current_status` is the candidate's status as of validation time; grid
///   slots with no backing session row pass `Available`.
/// * `student_bookings` is the student's existing session list across ALL
///   tutors (the daily limit is global, not per tutor).
///
/// Rules, first failure wins:
/// 1. Slot start must be at least `min_lead_hours` after `now_utc`; the exact
///    boundary instant is accepted.
/// 2. The slot's weekday must be an allowed booking day.
/// 3. The student must stay under the per-day session limit for that date
///    (cancelled sessions do not count).
/// 4. The slot must still be `Available`.
pub fn can_book(
    candidate: &SlotCandidate,
    current_status: SessionStatus,
    now_utc: DateTime<Utc>,
    student_bookings: &[Session],
    constraints: &BookingConstraints,
    tz: Tz,
) -> Result<(), RejectionKind> {
    // Rule 1: lead time. A start inside a DST gap never occurs on the clock,
    // so it is unbookable outright.
    let start_utc = wall_clock_to_utc(candidate.start(), tz)
        .ok_or(RejectionKind::SlotNoLongerAvailable)?;
    if start_utc < now_utc + Duration::hours(constraints.min_lead_hours) {
        return Err(RejectionKind::InsufficientLeadTime);
    }

    // Rule 2: weekday restriction.
    if !constraints.allows_weekday(candidate.date.weekday()) {
        return Err(RejectionKind::ClosedDay);
    }

    // Rule 3: daily limit across all tutors.
    let same_day = student_bookings
        .iter()
        .filter(|s| s.date == candidate.date && s.status != SessionStatus::Cancelled)
        .count();
    if same_day >= constraints.max_bookings_per_student_per_day {
        return Err(RejectionKind::DailyLimitReached);
    }

    // Rule 4: freshness re-check, never trusted from a stale read.
    if current_status != SessionStatus::Available {
        return Err(RejectionKind::SlotNoLongerAvailable);
    }

    Ok(())
}
