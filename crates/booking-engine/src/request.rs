//! Custom slot-request workflow: draft -> pending -> approved | rejected.
//!
//! A student proposes an out-of-grid slot of fixed length for tutor approval.
//! Submission runs the same lead-time and daily-limit rules as grid booking
//! (a pre-check; the store's conditional writes stay authoritative).
//! Approval and rejection are terminal; the status vocabulary has no
//! `rejected`, so rejection lands as `Cancelled` with the reason recorded.
//! Meeting links for approved sessions are attached by the remote
//! collaborator, not by this engine.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::book::{map_transport, BookingEngine};
use crate::conflict;
use crate::error::{EngineError, Result};
use crate::model::{Session, SessionKind, SessionStatus, SlotCandidate, StudentRef};
use crate::store::{SessionFilter, SessionStore, StoreError};
use crate::validate;

/// A student's custom slot proposal, before submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRequest {
    pub tutor_id: String,
    pub tutor_name: String,
    pub subject: String,
    pub student: StudentRef,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Tutor/admin resolution of a pending slot request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestDecision {
    Approve,
    Reject { reason: Option<String> },
}

impl<S: SessionStore> BookingEngine<S> {
    /// Submit a custom slot request, moving it from draft to pending.
    ///
    /// Pre-checks lead time and the daily limit against the student's current
    /// bookings; the candidate has no backing session row yet, so the
    /// freshness rule passes vacuously. On success the store assigns the id
    /// and the returned session is `Pending`.
    pub fn submit_slot_request(
        &mut self,
        request: SlotRequest,
        now_utc: DateTime<Utc>,
    ) -> Result<Session> {
        let duration_minutes = self.config().slot_request_duration_min;
        let candidate = SlotCandidate {
            tutor_id: request.tutor_id.clone(),
            date: request.date,
            time: request.time,
            duration_minutes,
        };

        let student_bookings = self
            .store()
            .fetch_sessions(&SessionFilter::for_student(&request.student.student_id))
            .map_err(map_transport)?;

        validate::can_book(
            &candidate,
            SessionStatus::Available,
            now_utc,
            &student_bookings,
            &self.config().constraints,
            self.config().timezone,
        )?;

        let created_by = request.student.student_id.clone();
        let session = Session {
            id: String::new(),
            subject: request.subject,
            tutor_id: request.tutor_id,
            tutor_name: request.tutor_name,
            date: request.date,
            time: request.time,
            duration_minutes,
            status: SessionStatus::Pending,
            kind: SessionKind::SlotRequest,
            students: vec![request.student],
            created_by,
            meeting_link: None,
            cancellation_reason: None,
        };

        self.store_mut().create_session(session).map_err(map_transport)
    }

    /// Approve or reject a pending slot request. Both outcomes are terminal.
    ///
    /// Approval is refused with `Conflict` when the proposed interval
    /// overlaps one of the tutor's confirmed (approved or booked) sessions.
    /// A request that is no longer pending fails with `InvalidTransition`.
    pub fn resolve_slot_request(
        &mut self,
        session_id: &str,
        decision: RequestDecision,
    ) -> Result<Session> {
        let session = self
            .store()
            .fetch_session(session_id)
            .map_err(map_transport)?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;

        let target = match decision {
            RequestDecision::Approve => SessionStatus::Approved,
            RequestDecision::Reject { .. } => SessionStatus::Cancelled,
        };
        if session.status != SessionStatus::Pending {
            return Err(EngineError::InvalidTransition {
                from: session.status,
                to: target,
            });
        }

        match decision {
            RequestDecision::Approve => {
                let confirmed: Vec<Session> = self
                    .store()
                    .fetch_sessions(&SessionFilter::for_tutor(&session.tutor_id))
                    .map_err(map_transport)?
                    .into_iter()
                    .filter(|s| {
                        s.id != session.id
                            && matches!(
                                s.status,
                                SessionStatus::Approved | SessionStatus::Booked
                            )
                    })
                    .collect();

                let overlaps = conflict::find_overlaps(session.start(), session.end(), &confirmed);
                if let Some(hit) = overlaps.first() {
                    return Err(EngineError::Conflict(format!(
                        "request overlaps confirmed session {} by {} minutes",
                        hit.session_id, hit.overlap_minutes
                    )));
                }

                self.store_mut()
                    .update_status(session_id, SessionStatus::Pending, SessionStatus::Approved, None)
                    .map_err(|e| resolve_err(e, SessionStatus::Approved))
            }
            RequestDecision::Reject { reason } => self
                .store_mut()
                .update_status(session_id, SessionStatus::Pending, SessionStatus::Cancelled, reason)
                .map_err(|e| resolve_err(e, SessionStatus::Cancelled)),
        }
    }
}

fn resolve_err(e: StoreError, target: SessionStatus) -> EngineError {
    match e {
        // Someone resolved the request between our read and the write.
        StoreError::Conflict { actual, .. } => EngineError::InvalidTransition {
            from: actual,
            to: target,
        },
        other => map_transport(other),
    }
}
