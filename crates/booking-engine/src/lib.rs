//! # booking-engine
//!
//! Deterministic session-slot availability and booking engine for tutoring
//! schedules.
//!
//! The engine turns a tutor's recurring weekly availability plus their
//! existing sessions into the set of actually bookable slots for a date,
//! validates booking attempts against an injected policy, and drives
//! conditional-write bookings against a remote session store. All decision
//! logic is pure and clock-free; "now" is always a parameter.
//!
//! ## Modules
//!
//! - [`grid`] — discrete time-of-day slot generation
//! - [`reconcile`] — weekly pattern + sessions → bookable slot candidates
//! - [`validate`] — the booking-window decision function
//! - [`book`] — the orchestrator around the store's conditional writes
//! - [`request`] — custom slot-request workflow (pending → approved/rejected)
//! - [`conflict`] — interval-overlap detection for request approval
//! - [`store`] — the remote store boundary and an in-memory implementation
//! - [`model`], [`config`], [`error`] — data model, policy, error types

pub mod book;
pub mod config;
pub mod conflict;
pub mod error;
pub mod grid;
pub mod model;
pub mod reconcile;
pub mod request;
pub mod store;
pub mod validate;

pub use book::{BookingEngine, BookingOutcome};
pub use config::{BookingConstraints, EngineConfig};
pub use error::{EngineError, Result};
pub use grid::{generate_slots, twelve_hour_label, valid_end_times, GridSlot};
pub use model::{
    DayWindow, Session, SessionKind, SessionStatus, SlotCandidate, StudentRef, WeeklyAvailability,
};
pub use reconcile::bookable_slots;
pub use request::{RequestDecision, SlotRequest};
pub use store::{MemoryStore, SessionFilter, SessionStore, StoreError};
pub use validate::{can_book, RejectionKind};
