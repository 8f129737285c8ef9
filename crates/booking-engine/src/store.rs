//! The remote session/availability store boundary.
//!
//! The backend owns the wire format; this module owns only the logical
//! operations and their conditional-write contract. Every mutation states the
//! status it expects to find, and the store answers `Conflict` when a
//! concurrent writer got there first -- the engine never discovers drift by
//! re-reading after the fact.
//!
//! [`MemoryStore`] is an in-process implementation of the same contract,
//! used by tests and the CLI.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Session, SessionStatus, StudentRef, WeeklyAvailability};

/// Errors surfaced by a [`SessionStore`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    /// Conditional write precondition failed -- a concurrent writer changed
    /// the record between the caller's read and this write.
    #[error("conditional write failed: expected {expected}, found {actual}")]
    Conflict {
        expected: SessionStatus,
        actual: SessionStatus,
    },

    /// Transport-level failure. Retryable at the caller's discretion.
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Server-side query filter for session lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Inclusive date range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl SessionFilter {
    pub fn for_tutor(tutor_id: impl Into<String>) -> Self {
        Self {
            tutor_id: Some(tutor_id.into()),
            ..Self::default()
        }
    }

    pub fn for_student(student_id: impl Into<String>) -> Self {
        Self {
            student_id: Some(student_id.into()),
            ..Self::default()
        }
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date_range = Some((date, date));
        self
    }

    /// Whether a session satisfies every populated criterion.
    ///
    /// Student filtering matches membership in the session's student list.
    pub fn matches(&self, session: &Session) -> bool {
        if let Some(tutor_id) = &self.tutor_id {
            if &session.tutor_id != tutor_id {
                return false;
            }
        }
        if let Some(student_id) = &self.student_id {
            if !session.involves_student(student_id) {
                return false;
            }
        }
        if let Some((from, to)) = self.date_range {
            if session.date < from || session.date > to {
                return false;
            }
        }
        true
    }
}

/// Logical operations against the remote session/availability store.
pub trait SessionStore {
    fn fetch_availability(&self, tutor_id: &str) -> Result<WeeklyAvailability, StoreError>;

    fn put_availability(
        &mut self,
        tutor_id: &str,
        availability: WeeklyAvailability,
    ) -> Result<(), StoreError>;

    /// Sessions matching the filter, ordered by (date, time, id).
    fn fetch_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>, StoreError>;

    fn fetch_session(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    /// Conditionally book a session: flip `expected_status` to `Booked` and
    /// append the student, atomically. Fails with [`StoreError::Conflict`]
    /// when the session is no longer in `expected_status`.
    fn book_session(
        &mut self,
        session_id: &str,
        student: StudentRef,
        expected_status: SessionStatus,
    ) -> Result<Session, StoreError>;

    /// Persist a new session. The store assigns the id; any id on the input
    /// is ignored. Returns the stored record.
    fn create_session(&mut self, session: Session) -> Result<Session, StoreError>;

    /// Conditionally move a session from `expected` to `next`, recording an
    /// optional reason (used for slot-request rejection).
    fn update_status(
        &mut self,
        session_id: &str,
        expected: SessionStatus,
        next: SessionStatus,
        reason: Option<String>,
    ) -> Result<Session, StoreError>;
}

/// In-process [`SessionStore`] honoring the conditional-write contract.
///
/// Sessions live in a `BTreeMap` so listing order is deterministic across
/// runs; `fetch_sessions` re-sorts by (date, time, id) regardless.
#[derive(Debug, Default)]
pub struct MemoryStore {
    availability: HashMap<String, WeeklyAvailability>,
    sessions: BTreeMap<String, Session>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tutor's availability.
    pub fn insert_availability(&mut self, tutor_id: impl Into<String>, av: WeeklyAvailability) {
        self.availability.insert(tutor_id.into(), av);
    }

    /// Seed a session with its id taken as-is.
    pub fn insert_session(&mut self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl SessionStore for MemoryStore {
    fn fetch_availability(&self, tutor_id: &str) -> Result<WeeklyAvailability, StoreError> {
        self.availability
            .get(tutor_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(tutor_id.to_string()))
    }

    fn put_availability(
        &mut self,
        tutor_id: &str,
        availability: WeeklyAvailability,
    ) -> Result<(), StoreError> {
        self.availability.insert(tutor_id.to_string(), availability);
        Ok(())
    }

    fn fetch_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>, StoreError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| (a.date, a.time, &a.id).cmp(&(b.date, b.time, &b.id)));
        Ok(sessions)
    }

    fn fetch_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(session_id).cloned())
    }

    fn book_session(
        &mut self,
        session_id: &str,
        student: StudentRef,
        expected_status: SessionStatus,
    ) -> Result<Session, StoreError> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;

        if session.status != expected_status {
            return Err(StoreError::Conflict {
                expected: expected_status,
                actual: session.status,
            });
        }

        session.status = SessionStatus::Booked;
        if !session.involves_student(&student.student_id) {
            session.students.push(student);
        }
        Ok(session.clone())
    }

    fn create_session(&mut self, mut session: Session) -> Result<Session, StoreError> {
        self.next_id += 1;
        session.id = format!("s-{:04}", self.next_id);
        let stored = session.clone();
        self.sessions.insert(session.id.clone(), session);
        Ok(stored)
    }

    fn update_status(
        &mut self,
        session_id: &str,
        expected: SessionStatus,
        next: SessionStatus,
        reason: Option<String>,
    ) -> Result<Session, StoreError> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;

        if session.status != expected {
            return Err(StoreError::Conflict {
                expected,
                actual: session.status,
            });
        }

        session.status = next;
        if reason.is_some() {
            session.cancellation_reason = reason;
        }
        Ok(session.clone())
    }
}
