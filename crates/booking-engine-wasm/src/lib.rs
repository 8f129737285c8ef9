//! WASM bindings for booking-engine.
//!
//! Exposes slot-grid generation, availability reconciliation, and the
//! advisory booking check to JavaScript via `wasm-bindgen`. All complex types
//! are passed as JSON strings.
//!
//! The `canBook` export is the client-side, non-authoritative check used for
//! immediate UI feedback. The server re-runs the same rules against fresh
//! state on every booking attempt; this binding must never replace that call.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/booking-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/booking_engine_wasm.wasm
//! ```

use booking_engine::config::BookingConstraints;
use booking_engine::model::{Session, SessionStatus, SlotCandidate, WeeklyAvailability};
use booking_engine::validate;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GridSlotDto {
    time: String,
    label: String,
}

#[derive(Serialize)]
struct SlotCandidateDto {
    tutor_id: String,
    date: String,
    time: String,
    duration_minutes: u32,
}

impl From<&SlotCandidate> for SlotCandidateDto {
    fn from(c: &SlotCandidate) -> Self {
        Self {
            tutor_id: c.tutor_id.clone(),
            date: c.date.to_string(),
            time: c.time.format("%H:%M").to_string(),
            duration_minutes: c.duration_minutes,
        }
    }
}

/// Outcome of the advisory booking check.
#[derive(Serialize)]
struct CheckResultDto {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", s, e)))
}

fn parse_time(s: &str) -> Result<chrono::NaiveTime, JsValue> {
    chrono::NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| chrono::NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| JsValue::from_str(&format!("Invalid time '{}': {}", s, e)))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, JsValue> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| JsValue::from_str(&format!("Invalid instant '{}': {}", s, e)))
}

fn parse_timezone(s: &str) -> Result<Tz, JsValue> {
    s.parse()
        .map_err(|_| JsValue::from_str(&format!("Invalid timezone '{}'", s)))
}

fn parse_sessions_json(json: &str) -> Result<Vec<Session>, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid sessions JSON: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Generate the full-day slot grid at a granularity.
///
/// Returns a JSON array of `{time, label}` objects, times in "HH:MM" form and
/// labels in 12-hour display form.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(granularity_minutes: u32) -> Result<String, JsValue> {
    let slots = booking_engine::generate_slots(granularity_minutes)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let dtos: Vec<GridSlotDto> = slots
        .iter()
        .map(|s| GridSlotDto {
            time: s.time.format("%H:%M").to_string(),
            label: s.label.clone(),
        })
        .collect();

    to_json(&dtos)
}

/// Valid end-time choices for a selection starting at `start` ("HH:MM").
#[wasm_bindgen(js_name = "validEndTimes")]
pub fn valid_end_times(
    start: &str,
    min_duration_slots: u32,
    granularity_minutes: u32,
) -> Result<String, JsValue> {
    let start = parse_time(start)?;
    let slots = booking_engine::valid_end_times(start, min_duration_slots, granularity_minutes)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let dtos: Vec<GridSlotDto> = slots
        .iter()
        .map(|s| GridSlotDto {
            time: s.time.format("%H:%M").to_string(),
            label: s.label.clone(),
        })
        .collect();

    to_json(&dtos)
}

/// Reconcile a tutor's weekly availability with their sessions for one date.
///
/// `availability_json` is a weekly availability object (weekday keys, each an
/// optional `{start, end}` window); `sessions_json` is the tutor's session
/// list. Returns a JSON array of bookable slot candidates.
#[wasm_bindgen(js_name = "bookableSlots")]
pub fn bookable_slots(
    tutor_id: &str,
    availability_json: &str,
    sessions_json: &str,
    date: &str,
    granularity_minutes: u32,
) -> Result<String, JsValue> {
    let availability: WeeklyAvailability = serde_json::from_str(availability_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid availability JSON: {}", e)))?;
    let sessions = parse_sessions_json(sessions_json)?;
    let date = parse_date(date)?;

    let slots = booking_engine::bookable_slots(
        tutor_id,
        &availability,
        date,
        &sessions,
        granularity_minutes,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let dtos: Vec<SlotCandidateDto> = slots.iter().map(SlotCandidateDto::from).collect();
    to_json(&dtos)
}

/// Advisory booking check for immediate UI feedback.
///
/// `candidate_json` is a `{tutor_id, date, time, duration_minutes}` object,
/// `current_status` one of the session status strings, `now` an RFC 3339
/// instant, `bookings_json` the student's existing sessions across all
/// tutors, and `constraints_json` an optional policy override (pass null or
/// an empty string for the defaults). Returns `{allowed, rejection?,
/// message?}` where `rejection` is the machine-readable kind.
#[wasm_bindgen(js_name = "canBook")]
pub fn can_book(
    candidate_json: &str,
    current_status: &str,
    now: &str,
    bookings_json: &str,
    constraints_json: Option<String>,
    timezone: &str,
) -> Result<String, JsValue> {
    let candidate: SlotCandidate = serde_json::from_str(candidate_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid candidate JSON: {}", e)))?;
    let status: SessionStatus = serde_json::from_str(&format!("\"{}\"", current_status))
        .map_err(|e| JsValue::from_str(&format!("Invalid status '{}': {}", current_status, e)))?;
    let now = parse_instant(now)?;
    let bookings = parse_sessions_json(bookings_json)?;
    let tz = parse_timezone(timezone)?;

    let constraints = match constraints_json.as_deref() {
        None | Some("") => BookingConstraints::default(),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid constraints JSON: {}", e)))?,
    };

    let result = match validate::can_book(&candidate, status, now, &bookings, &constraints, tz) {
        Ok(()) => CheckResultDto {
            allowed: true,
            rejection: None,
            message: None,
        },
        Err(kind) => CheckResultDto {
            allowed: false,
            rejection: Some(
                serde_json::to_value(kind)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default(),
            ),
            message: Some(kind.to_string()),
        },
    };

    to_json(&result)
}
