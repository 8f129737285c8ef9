//! Interval-overlap detection against a session list.
//!
//! Used when approving a custom slot request: the proposed interval must not
//! overlap any of the tutor's already-confirmed sessions. Adjacent intervals
//! (one ends exactly when the other starts) are NOT conflicts.

use chrono::NaiveDateTime;

use crate::model::Session;

/// A detected overlap between a proposed interval and an existing session.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub session_id: String,
    pub overlap_minutes: i64,
}

/// Find every session whose interval overlaps `[start, end)`.
///
/// Two intervals overlap iff `a.start < b.end && b.start < a.end`, which
/// excludes the back-to-back case.
pub fn find_overlaps(
    start: NaiveDateTime,
    end: NaiveDateTime,
    sessions: &[Session],
) -> Vec<Overlap> {
    sessions
        .iter()
        .filter(|s| s.start() < end && start < s.end())
        .map(|s| {
            let overlap_start = start.max(s.start());
            let overlap_end = end.min(s.end());
            Overlap {
                session_id: s.id.clone(),
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}
