//! The booking orchestrator: ties the reconciler, validator, and store
//! together around a single conditional write.
//!
//! One attempt per call, no retry loop -- a lost race surfaces as
//! `Rejected(SlotNoLongerAvailable)` so the caller can refresh the grid and
//! let the user pick again. Automatic retries risk duplicate bookings.

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::grid::{self, GridSlot};
use crate::model::{Session, SessionStatus, SlotCandidate, StudentRef, WeeklyAvailability};
use crate::reconcile;
use crate::store::{SessionFilter, SessionStore, StoreError};
use crate::validate::{self, RejectionKind};

/// Result of a successful booking, including the refreshed lists.
///
/// The refresh is a consistency-repair step, not an optimization: it makes
/// the one-per-day constraint enforceable on the student's next attempt
/// without waiting for another fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingOutcome {
    /// The session as booked by the store.
    pub session: Session,
    /// The tutor's full session list after the booking.
    pub tutor_sessions: Vec<Session>,
    /// The student's booking list after the booking.
    pub student_bookings: Vec<Session>,
}

/// Stateless facade over a [`SessionStore`] plus an [`EngineConfig`].
///
/// Holds no session state of its own; every operation re-fetches what it
/// needs so two engines pointed at the same store never disagree for longer
/// than one round-trip.
pub struct BookingEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: SessionStore> BookingEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The bookable slots for one tutor on one date, at the student-facing
    /// booking granularity.
    ///
    /// `TutorNotFound` only when the tutor id is unresolvable;
    /// `AvailabilityFetch` when the upstream store call fails (retryable by
    /// the caller). A day off is an empty list, never an error.
    pub fn bookable_slots(&self, tutor_id: &str, date: NaiveDate) -> Result<Vec<SlotCandidate>> {
        let availability = self
            .store
            .fetch_availability(tutor_id)
            .map_err(|e| match e {
                StoreError::NotFound(_) => EngineError::TutorNotFound(tutor_id.to_string()),
                other => EngineError::AvailabilityFetch(other.to_string()),
            })?;

        let sessions = self
            .store
            .fetch_sessions(&SessionFilter::for_tutor(tutor_id).on_date(date))
            .map_err(|e| EngineError::AvailabilityFetch(e.to_string()))?;

        reconcile::bookable_slots(
            tutor_id,
            &availability,
            date,
            &sessions,
            self.config.booking_granularity_min,
        )
    }

    /// Full-day grid at the availability-editing granularity.
    pub fn editing_grid(&self) -> Result<Vec<GridSlot>> {
        grid::generate_slots(self.config.editing_granularity_min)
    }

    /// End-time choices for an editing selection starting at `start`.
    pub fn editing_end_times(
        &self,
        start: chrono::NaiveTime,
        min_duration_slots: u32,
    ) -> Result<Vec<GridSlot>> {
        grid::valid_end_times(start, min_duration_slots, self.config.editing_granularity_min)
    }

    /// Replace a tutor's weekly availability after checking window invariants.
    pub fn set_availability(
        &mut self,
        tutor_id: &str,
        availability: WeeklyAvailability,
    ) -> Result<()> {
        availability.validate()?;
        self.store
            .put_availability(tutor_id, availability)
            .map_err(|e| EngineError::Network(e.to_string()))
    }

    /// Book a slot for a student. Single attempt, authoritative validation.
    ///
    /// Re-fetches the target session and the student's bookings, re-runs the
    /// validator against that fresh state, then issues one conditional write
    /// (`Available` -> `Booked`). A store-level conflict means another client
    /// took the slot first and surfaces as `Rejected(SlotNoLongerAvailable)`,
    /// not a generic error, so the UI can prompt for a different slot.
    pub fn book_slot(
        &mut self,
        session_id: &str,
        student: StudentRef,
        now_utc: DateTime<Utc>,
    ) -> Result<BookingOutcome> {
        let session = self
            .store
            .fetch_session(session_id)
            .map_err(map_transport)?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;

        let student_bookings = self
            .store
            .fetch_sessions(&SessionFilter::for_student(&student.student_id))
            .map_err(map_transport)?;

        let candidate = SlotCandidate::from(&session);
        validate::can_book(
            &candidate,
            session.status,
            now_utc,
            &student_bookings,
            &self.config.constraints,
            self.config.timezone,
        )?;

        let booked = match self
            .store
            .book_session(session_id, student.clone(), SessionStatus::Available)
        {
            Ok(s) => s,
            Err(StoreError::Conflict { .. }) => {
                return Err(EngineError::Rejected(RejectionKind::SlotNoLongerAvailable))
            }
            Err(StoreError::NotFound(id)) => return Err(EngineError::SessionNotFound(id)),
            Err(other) => return Err(map_transport(other)),
        };

        // Consistency repair: refresh both lists the UI renders from.
        let tutor_sessions = self
            .store
            .fetch_sessions(&SessionFilter::for_tutor(&booked.tutor_id))
            .map_err(map_transport)?;
        let student_bookings = self
            .store
            .fetch_sessions(&SessionFilter::for_student(&student.student_id))
            .map_err(map_transport)?;

        Ok(BookingOutcome {
            session: booked,
            tutor_sessions,
            student_bookings,
        })
    }
}

/// Map store failures outside the availability path onto engine errors.
pub(crate) fn map_transport(e: StoreError) -> EngineError {
    match e {
        StoreError::NotFound(id) => EngineError::SessionNotFound(id),
        StoreError::Malformed(msg) => EngineError::Malformed(msg),
        StoreError::Conflict { expected, actual } => EngineError::Conflict(format!(
            "expected {expected}, found {actual}"
        )),
        StoreError::Transport(msg) => EngineError::Network(msg),
    }
}
