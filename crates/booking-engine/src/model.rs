//! Core data model: weekly availability, sessions, and derived slot candidates.
//!
//! All types mirror the backend's JSON vocabulary (snake_case statuses and
//! kinds) so they can cross the store boundary without a translation layer.
//! Dates and times are wall-clock values in the deployment timezone; only the
//! validator converts to UTC, and only for lead-time comparison.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A single contiguous availability interval within one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DayWindow {
    /// Build a window, enforcing `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }
}

/// A tutor's recurring weekly availability: at most one window per weekday.
///
/// The current model intentionally allows only one contiguous interval per
/// day; split shifts would require a `Vec<DayWindow>` per weekday.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayWindow>,
}

impl WeeklyAvailability {
    /// The window for a weekday, if the tutor works that day.
    pub fn window_for(&self, weekday: Weekday) -> Option<DayWindow> {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    /// Set (or clear, with `None`) the window for a weekday.
    pub fn set_window(&mut self, weekday: Weekday, window: Option<DayWindow>) {
        let slot = match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *slot = window;
    }

    /// Check the `start < end` invariant on every populated window.
    ///
    /// Deserialized payloads bypass [`DayWindow::new`], so stores call this
    /// before persisting an edit.
    pub fn validate(&self) -> Result<()> {
        for window in [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
        .into_iter()
        .flatten()
        {
            DayWindow::new(window.start, window.end)?;
        }
        Ok(())
    }
}

/// Lifecycle status of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Available,
    Booked,
    Completed,
    Pending,
    Approved,
    Cancelled,
}

impl SessionStatus {
    /// Whether a session in this status occupies its grid slot.
    ///
    /// Booked, approved, pending, and completed sessions all block the slot;
    /// an `Available` session IS the slot, and a cancelled session frees it.
    pub fn blocks_slot(self) -> bool {
        !matches!(self, SessionStatus::Available | SessionStatus::Cancelled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Available => "available",
            SessionStatus::Booked => "booked",
            SessionStatus::Completed => "completed",
            SessionStatus::Pending => "pending",
            SessionStatus::Approved => "approved",
            SessionStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// How a session came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    AdminCreated,
    TutorCreated,
    SlotRequest,
    SmartQuad,
}

/// A student attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    pub student_id: String,
    pub student_name: String,
}

/// One concrete bookable or booked unit of instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub subject: String,
    pub tutor_id: String,
    pub tutor_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub status: SessionStatus,
    pub kind: SessionKind,
    #[serde(default)]
    pub students: Vec<StudentRef>,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

impl Session {
    /// Wall-clock start of the session.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Wall-clock end of the session.
    pub fn end(&self) -> NaiveDateTime {
        self.start() + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn involves_student(&self, student_id: &str) -> bool {
        self.students.iter().any(|s| s.student_id == student_id)
    }

    /// Check the status/students invariant: booked or approved sessions carry
    /// at least one student, available sessions carry none.
    pub fn validate(&self) -> Result<()> {
        match self.status {
            SessionStatus::Booked | SessionStatus::Approved if self.students.is_empty() => {
                Err(EngineError::Malformed(format!(
                    "session {} is {} but has no students",
                    self.id, self.status
                )))
            }
            SessionStatus::Available if !self.students.is_empty() => {
                Err(EngineError::Malformed(format!(
                    "session {} is available but has students attached",
                    self.id
                )))
            }
            _ => Ok(()),
        }
    }
}

/// A bookable slot derived by the reconciler. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCandidate {
    pub tutor_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
}

impl SlotCandidate {
    /// Wall-clock start of the candidate slot.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

impl From<&Session> for SlotCandidate {
    fn from(session: &Session) -> Self {
        Self {
            tutor_id: session.tutor_id.clone(),
            date: session.date,
            time: session.time,
            duration_minutes: session.duration_minutes,
        }
    }
}
