//! Error types for booking-engine operations.

use chrono::NaiveTime;
use thiserror::Error;

use crate::model::SessionStatus;
use crate::validate::RejectionKind;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The slot granularity must be positive and evenly divide a day.
    #[error("invalid granularity: {0} minutes does not evenly divide 1440")]
    InvalidGranularity(u32),

    /// An availability window with `start >= end`.
    #[error("invalid availability window: {start} is not before {end}")]
    InvalidWindow { start: NaiveTime, end: NaiveTime },

    #[error("tutor not found: {0}")]
    TutorNotFound(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The upstream availability/session store call failed. Retryable at the
    /// caller's discretion.
    #[error("availability fetch failed: {0}")]
    AvailabilityFetch(String),

    /// A booking request failed validation. Expected, user-facing outcome —
    /// rendered as a message, never logged as a system error.
    #[error("booking rejected: {0}")]
    Rejected(#[from] RejectionKind),

    /// The requested change lost to a concurrent writer (conditional write
    /// precondition failed) or overlaps an already-confirmed session.
    #[error("conflicting session state: {0}")]
    Conflict(String),

    /// A slot-request transition that the workflow does not permit.
    #[error("invalid transition: {from} sessions cannot move to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    /// Transport-level failure talking to the remote store. Retryable.
    #[error("network error: {0}")]
    Network(String),

    /// The remote store returned a payload the engine cannot interpret.
    /// Propagates uncaught to the top-level failure boundary.
    #[error("malformed server payload: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
