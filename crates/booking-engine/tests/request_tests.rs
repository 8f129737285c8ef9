//! Tests for the custom slot-request workflow.

use booking_engine::error::EngineError;
use booking_engine::model::{
    DayWindow, Session, SessionKind, SessionStatus, StudentRef, WeeklyAvailability,
};
use booking_engine::request::{RequestDecision, SlotRequest};
use booking_engine::store::MemoryStore;
use booking_engine::validate::RejectionKind;
use booking_engine::BookingEngine;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn t(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap()
}

fn monday() -> NaiveDate {
    // 2026-03-16 is a Monday.
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn student(id: &str) -> StudentRef {
    StudentRef {
        student_id: id.to_string(),
        student_name: format!("Student {}", id),
    }
}

fn request_at(date: NaiveDate, time: NaiveTime) -> SlotRequest {
    SlotRequest {
        tutor_id: "t1".to_string(),
        tutor_name: "Tutor One".to_string(),
        subject: "Chemistry".to_string(),
        student: student("stu-1"),
        date,
        time,
    }
}

fn session_for_tutor(
    id: &str,
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: u32,
    status: SessionStatus,
) -> Session {
    Session {
        id: id.to_string(),
        subject: "Chemistry".to_string(),
        tutor_id: "t1".to_string(),
        tutor_name: "Tutor One".to_string(),
        date,
        time,
        duration_minutes,
        status,
        kind: SessionKind::SlotRequest,
        students: vec![student("stu-9")],
        created_by: "stu-9".to_string(),
        meeting_link: None,
        cancellation_reason: None,
    }
}

fn engine() -> BookingEngine<MemoryStore> {
    // Requests are out-of-grid; the weekly pattern is irrelevant here.
    let mut store = MemoryStore::new();
    store.insert_availability("t1", WeeklyAvailability::default());
    BookingEngine::new(store)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 8, 0, 0).unwrap()
}

// ── Submission ──────────────────────────────────────────────────────────────

#[test]
fn submission_inside_the_lead_window_is_rejected() {
    // now + 10 hours with a 12-hour minimum lead.
    let mut eng = engine();
    let result = eng.submit_slot_request(request_at(monday(), t(18, 0)), now());
    assert!(matches!(
        result,
        Err(EngineError::Rejected(RejectionKind::InsufficientLeadTime))
    ));
}

#[test]
fn resubmission_outside_the_lead_window_enters_pending() {
    // now + 13 hours: accepted into pending.
    let mut eng = engine();
    let session = eng
        .submit_slot_request(request_at(monday(), t(21, 0)), now())
        .unwrap();

    assert_eq!(session.status, SessionStatus::Pending);
    assert_eq!(session.kind, SessionKind::SlotRequest);
    assert_eq!(session.duration_minutes, 120);
    assert!(session.involves_student("stu-1"));
    assert_eq!(session.created_by, "stu-1");
    assert!(!session.id.is_empty(), "the store assigns the id");
    assert!(session.meeting_link.is_none());
}

#[test]
fn submission_respects_the_daily_limit() {
    let mut eng = engine();
    let mut existing = session_for_tutor("b1", monday(), t(9, 0), 60, SessionStatus::Booked);
    existing.students = vec![student("stu-1")];
    eng.store_mut().insert_session(existing);

    let result = eng.submit_slot_request(request_at(monday(), t(21, 0)), now());
    assert!(matches!(
        result,
        Err(EngineError::Rejected(RejectionKind::DailyLimitReached))
    ));
}

#[test]
fn submission_respects_closed_days() {
    // 2026-03-22 is a Sunday.
    let mut eng = engine();
    let sunday = NaiveDate::from_ymd_opt(2026, 3, 22).unwrap();
    let result = eng.submit_slot_request(request_at(sunday, t(12, 0)), now());
    assert!(matches!(
        result,
        Err(EngineError::Rejected(RejectionKind::ClosedDay))
    ));
}

// ── Approval ────────────────────────────────────────────────────────────────

#[test]
fn approving_a_pending_request_with_no_conflicts() {
    let mut eng = engine();
    let pending = eng
        .submit_slot_request(request_at(monday(), t(21, 0)), now())
        .unwrap();

    let approved = eng
        .resolve_slot_request(&pending.id, RequestDecision::Approve)
        .unwrap();
    assert_eq!(approved.status, SessionStatus::Approved);
    approved.validate().unwrap();
}

#[test]
fn approval_fails_when_overlapping_a_confirmed_session() {
    let mut eng = engine();
    // Request covers 14:00-16:00; a confirmed session covers 15:00-16:00.
    eng.store_mut().insert_session(session_for_tutor(
        "appr-1",
        monday(),
        t(15, 0),
        60,
        SessionStatus::Approved,
    ));
    let pending = eng
        .submit_slot_request(request_at(monday(), t(14, 0)), now())
        .unwrap();

    let result = eng.resolve_slot_request(&pending.id, RequestDecision::Approve);
    assert!(matches!(result, Err(EngineError::Conflict(_))));
}

#[test]
fn approval_also_checks_booked_sessions() {
    let mut eng = engine();
    eng.store_mut().insert_session(session_for_tutor(
        "book-1",
        monday(),
        t(21, 30),
        60,
        SessionStatus::Booked,
    ));
    let pending = eng
        .submit_slot_request(request_at(monday(), t(21, 0)), now())
        .unwrap();

    let result = eng.resolve_slot_request(&pending.id, RequestDecision::Approve);
    assert!(matches!(result, Err(EngineError::Conflict(_))));
}

#[test]
fn back_to_back_sessions_are_not_conflicts() {
    let mut eng = engine();
    // Confirmed session ends exactly when the request begins.
    eng.store_mut().insert_session(session_for_tutor(
        "appr-1",
        monday(),
        t(19, 0),
        120,
        SessionStatus::Approved,
    ));
    let pending = eng
        .submit_slot_request(request_at(monday(), t(21, 0)), now())
        .unwrap();

    let approved = eng
        .resolve_slot_request(&pending.id, RequestDecision::Approve)
        .unwrap();
    assert_eq!(approved.status, SessionStatus::Approved);
}

#[test]
fn pending_sessions_do_not_block_approval() {
    let mut eng = engine();
    eng.store_mut().insert_session(session_for_tutor(
        "pend-1",
        monday(),
        t(21, 0),
        120,
        SessionStatus::Pending,
    ));
    let pending = eng
        .submit_slot_request(request_at(monday(), t(22, 0)), now())
        .unwrap();

    // The overlapping record is only pending, not confirmed.
    let approved = eng
        .resolve_slot_request(&pending.id, RequestDecision::Approve)
        .unwrap();
    assert_eq!(approved.status, SessionStatus::Approved);
}

// ── Rejection ───────────────────────────────────────────────────────────────

#[test]
fn rejection_records_the_reason() {
    let mut eng = engine();
    let pending = eng
        .submit_slot_request(request_at(monday(), t(21, 0)), now())
        .unwrap();

    let rejected = eng
        .resolve_slot_request(
            &pending.id,
            RequestDecision::Reject {
                reason: Some("tutor is on leave".to_string()),
            },
        )
        .unwrap();
    assert_eq!(rejected.status, SessionStatus::Cancelled);
    assert_eq!(rejected.cancellation_reason.as_deref(), Some("tutor is on leave"));
}

#[test]
fn rejection_without_a_reason_is_allowed() {
    let mut eng = engine();
    let pending = eng
        .submit_slot_request(request_at(monday(), t(21, 0)), now())
        .unwrap();

    let rejected = eng
        .resolve_slot_request(&pending.id, RequestDecision::Reject { reason: None })
        .unwrap();
    assert_eq!(rejected.status, SessionStatus::Cancelled);
    assert!(rejected.cancellation_reason.is_none());
}

// ── Terminal states ─────────────────────────────────────────────────────────

#[test]
fn resolved_requests_cannot_be_resolved_again() {
    let mut eng = engine();
    let pending = eng
        .submit_slot_request(request_at(monday(), t(21, 0)), now())
        .unwrap();
    eng.resolve_slot_request(&pending.id, RequestDecision::Approve)
        .unwrap();

    let again = eng.resolve_slot_request(&pending.id, RequestDecision::Approve);
    assert!(matches!(
        again,
        Err(EngineError::InvalidTransition {
            from: SessionStatus::Approved,
            ..
        })
    ));

    let reject_after = eng.resolve_slot_request(&pending.id, RequestDecision::Reject { reason: None });
    assert!(matches!(reject_after, Err(EngineError::InvalidTransition { .. })));
}

#[test]
fn unknown_request_is_session_not_found() {
    let mut eng = engine();
    let result = eng.resolve_slot_request("missing", RequestDecision::Approve);
    assert!(matches!(result, Err(EngineError::SessionNotFound(_))));
}

// ── Interaction with the grid ───────────────────────────────────────────────

#[test]
fn a_pending_request_blocks_its_grid_slot() {
    let mut eng = engine();
    eng.store_mut().insert_availability(
        "t1",
        WeeklyAvailability {
            monday: Some(DayWindow {
                start: t(20, 0),
                end: t(23, 0),
            }),
            ..WeeklyAvailability::default()
        },
    );
    eng.submit_slot_request(request_at(monday(), t(21, 0)), now())
        .unwrap();

    let slots = eng.bookable_slots("t1", monday()).unwrap();
    assert!(slots.iter().all(|s| s.time != t(21, 0)));
    assert!(slots.iter().any(|s| s.time == t(20, 0)));
}
