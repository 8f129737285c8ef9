//! Engine configuration: grid granularities and booking policy.
//!
//! The source deployment used scattered literals for these values; here they
//! are a single injected configuration so per-deployment tuning and isolated
//! testing stay possible.

use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Grid step for student-facing booking displays.
pub const BOOKING_GRANULARITY_MIN: u32 = 60;

/// Grid step for admin/tutor availability editing.
pub const EDITING_GRANULARITY_MIN: u32 = 30;

/// Fixed length of a custom slot request.
pub const SLOT_REQUEST_DURATION_MIN: u32 = 120;

/// Temporal booking policy consumed by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConstraints {
    /// Minimum hours between "now" and the slot start.
    pub min_lead_hours: i64,
    /// Maximum sessions a student may hold per calendar day, across all tutors.
    pub max_bookings_per_student_per_day: usize,
    /// Weekdays on which booking is open at all.
    pub allowed_weekdays: Vec<Weekday>,
}

impl BookingConstraints {
    pub fn allows_weekday(&self, weekday: Weekday) -> bool {
        self.allowed_weekdays.contains(&weekday)
    }
}

impl Default for BookingConstraints {
    /// 12-hour lead time, one booking per day, Monday through Saturday.
    fn default() -> Self {
        Self {
            min_lead_hours: 12,
            max_bookings_per_student_per_day: 1,
            allowed_weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
        }
    }
}

/// Full engine configuration.
///
/// The two granularities are distinct by design: booking screens show hourly
/// slots while availability editing works on a half-hour grid.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub booking_granularity_min: u32,
    pub editing_granularity_min: u32,
    pub slot_request_duration_min: u32,
    /// Timezone in which session dates/times are wall-clock values.
    pub timezone: Tz,
    pub constraints: BookingConstraints,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            booking_granularity_min: BOOKING_GRANULARITY_MIN,
            editing_granularity_min: EDITING_GRANULARITY_MIN,
            slot_request_duration_min: SLOT_REQUEST_DURATION_MIN,
            timezone: Tz::UTC,
            constraints: BookingConstraints::default(),
        }
    }
}
