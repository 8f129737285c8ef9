//! Property-based tests for grid generation and reconciliation.
//!
//! These verify invariants that should hold for *any* valid input, not just
//! the specific examples in `grid_tests.rs` and `reconcile_tests.rs`.

use booking_engine::grid::generate_slots;
use booking_engine::model::{
    DayWindow, Session, SessionKind, SessionStatus, StudentRef, WeeklyAvailability,
};
use booking_engine::reconcile::bookable_slots;
use chrono::{NaiveDate, NaiveTime};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Every granularity that evenly divides a day, as required by the grid.
fn arb_divisor() -> impl Strategy<Value = u32> {
    let divisors: Vec<u32> = (1..=1440).filter(|g| 1440 % g == 0).collect();
    proptest::sample::select(divisors)
}

fn arb_non_divisor() -> impl Strategy<Value = u32> {
    (1u32..=2000).prop_filter("must not divide 1440", |g| 1440 % g != 0)
}

fn arb_status() -> impl Strategy<Value = SessionStatus> {
    prop_oneof![
        Just(SessionStatus::Available),
        Just(SessionStatus::Booked),
        Just(SessionStatus::Completed),
        Just(SessionStatus::Pending),
        Just(SessionStatus::Approved),
        Just(SessionStatus::Cancelled),
    ]
}

/// Sessions for tutor "t1" on the target Monday at hour-aligned times.
fn arb_sessions() -> impl Strategy<Value = Vec<Session>> {
    prop::collection::vec((0u32..24, arb_status()), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (hour, status))| {
                let students = if status.blocks_slot() {
                    vec![StudentRef {
                        student_id: "stu-1".to_string(),
                        student_name: "Avery".to_string(),
                    }]
                } else {
                    vec![]
                };
                Session {
                    id: format!("s-{}", i),
                    subject: "Maths".to_string(),
                    tutor_id: "t1".to_string(),
                    tutor_name: "Tutor One".to_string(),
                    date: monday(),
                    time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                    duration_minutes: 60,
                    status,
                    kind: SessionKind::AdminCreated,
                    students,
                    created_by: "admin".to_string(),
                    meeting_link: None,
                    cancellation_reason: None,
                }
            })
            .collect()
    })
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn weekly_10_to_15() -> WeeklyAvailability {
    WeeklyAvailability {
        monday: Some(DayWindow {
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        }),
        ..WeeklyAvailability::default()
    }
}

// ---------------------------------------------------------------------------
// Grid properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn grid_has_exactly_day_over_granularity_slots(g in arb_divisor()) {
        let slots = generate_slots(g).unwrap();
        prop_assert_eq!(slots.len() as u32, 1440 / g);
    }

    #[test]
    fn grid_is_strictly_increasing_and_distinct(g in arb_divisor()) {
        let slots = generate_slots(g).unwrap();
        for pair in slots.windows(2) {
            prop_assert!(pair[0].time < pair[1].time);
        }
    }

    #[test]
    fn labels_round_trip_through_twelve_hour_form(g in arb_divisor()) {
        for slot in generate_slots(g).unwrap() {
            let parsed = NaiveTime::parse_from_str(&slot.label, "%I:%M %p").unwrap();
            prop_assert_eq!(parsed, slot.time);
        }
    }

    #[test]
    fn non_divisors_are_always_rejected(g in arb_non_divisor()) {
        prop_assert!(generate_slots(g).is_err());
    }
}

// ---------------------------------------------------------------------------
// Reconciliation properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn blocking_sessions_never_appear_in_the_output(sessions in arb_sessions()) {
        let slots = bookable_slots("t1", &weekly_10_to_15(), monday(), &sessions, 60).unwrap();
        for session in sessions.iter().filter(|s| s.status.blocks_slot()) {
            prop_assert!(
                slots.iter().all(|c| c.time != session.time),
                "blocked time {} leaked into the output",
                session.time
            );
        }
    }

    #[test]
    fn reconciliation_is_idempotent(sessions in arb_sessions()) {
        let first = bookable_slots("t1", &weekly_10_to_15(), monday(), &sessions, 60).unwrap();
        let second = bookable_slots("t1", &weekly_10_to_15(), monday(), &sessions, 60).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn output_is_sorted_and_duplicate_free(sessions in arb_sessions()) {
        let slots = bookable_slots("t1", &weekly_10_to_15(), monday(), &sessions, 60).unwrap();
        for pair in slots.windows(2) {
            prop_assert!(pair[0].time < pair[1].time);
        }
    }

    #[test]
    fn cancelled_sessions_never_shrink_the_grid(sessions in arb_sessions()) {
        // Dropping every cancelled session must not change the result.
        let kept: Vec<Session> = sessions
            .iter()
            .filter(|s| s.status != SessionStatus::Cancelled)
            .cloned()
            .collect();
        let with_cancelled = bookable_slots("t1", &weekly_10_to_15(), monday(), &sessions, 60).unwrap();
        let without = bookable_slots("t1", &weekly_10_to_15(), monday(), &kept, 60).unwrap();
        prop_assert_eq!(with_cancelled, without);
    }
}
