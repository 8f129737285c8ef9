//! `slotgrid` CLI — inspect tutor availability and pre-check bookings from
//! the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Print the half-hour editing grid
//! slotgrid grid --granularity 30
//!
//! # Bookable slots for a tutor on a date, from JSON exports
//! slotgrid slots -a availability.json -s sessions.json --tutor t1 --date 2026-03-16
//!
//! # Same, as machine-readable JSON
//! slotgrid slots -a availability.json -s sessions.json --tutor t1 --date 2026-03-16 --json
//!
//! # Advisory pre-check for a candidate slot
//! slotgrid check -s sessions.json --tutor t1 --date 2026-03-16 --time 14:00 \
//!   --student stu-1 --now 2026-03-09T09:00:00Z
//! ```
//!
//! The `check` subcommand runs the same validator the booking flow uses, but
//! against exported files -- it is advisory; the server re-validates every
//! real booking against live state.

use anyhow::{Context, Result};
use booking_engine::config::{BookingConstraints, BOOKING_GRANULARITY_MIN};
use booking_engine::grid::twelve_hour_label;
use booking_engine::model::{Session, SessionStatus, SlotCandidate, WeeklyAvailability};
use booking_engine::{bookable_slots, generate_slots, validate};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use std::process;

#[derive(Parser)]
#[command(
    name = "slotgrid",
    version,
    about = "Tutor session slot availability inspector"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full-day slot grid at a granularity
    Grid {
        /// Slot granularity in minutes (must evenly divide 1440)
        #[arg(long, default_value_t = BOOKING_GRANULARITY_MIN)]
        granularity: u32,
    },
    /// Compute bookable slots for a tutor on a date
    Slots {
        /// Weekly availability JSON file
        #[arg(short, long)]
        availability: String,
        /// Session list JSON file
        #[arg(short, long)]
        sessions: String,
        /// Tutor id
        #[arg(long)]
        tutor: String,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Slot granularity in minutes
        #[arg(long, default_value_t = BOOKING_GRANULARITY_MIN)]
        granularity: u32,
        /// Emit JSON instead of display labels
        #[arg(long)]
        json: bool,
    },
    /// Run the advisory booking pre-check for one candidate slot
    Check {
        /// Session list JSON file (all sessions, all tutors)
        #[arg(short, long)]
        sessions: String,
        /// Tutor id
        #[arg(long)]
        tutor: String,
        /// Candidate date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Candidate start time (HH:MM)
        #[arg(long)]
        time: String,
        /// Candidate duration in minutes
        #[arg(long, default_value_t = BOOKING_GRANULARITY_MIN)]
        duration: u32,
        /// Student id making the booking
        #[arg(long)]
        student: String,
        /// Validation instant (RFC 3339); defaults to the current time
        #[arg(long)]
        now: Option<String>,
        /// IANA timezone the schedule's wall-clock times live in
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Grid { granularity } => {
            let slots = generate_slots(granularity)?;
            for slot in slots {
                println!("{}", slot.label);
            }
        }
        Commands::Slots {
            availability,
            sessions,
            tutor,
            date,
            granularity,
            json,
        } => {
            let availability = read_availability(&availability)?;
            let sessions = read_sessions(&sessions)?;
            let date = parse_date(&date)?;

            let slots = bookable_slots(&tutor, &availability, date, &sessions, granularity)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else if slots.is_empty() {
                println!("no bookable slots for {} on {}", tutor, date);
            } else {
                for slot in slots {
                    println!("{}", twelve_hour_label(slot.time));
                }
            }
        }
        Commands::Check {
            sessions,
            tutor,
            date,
            time,
            duration,
            student,
            now,
            timezone,
        } => {
            let sessions = read_sessions(&sessions)?;
            let date = parse_date(&date)?;
            let time = parse_time(&time)?;
            let now = parse_now(now.as_deref())?;
            let tz: Tz = timezone
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown timezone: {}", timezone))?;

            let candidate = SlotCandidate {
                tutor_id: tutor.clone(),
                date,
                time,
                duration_minutes: duration,
            };

            // Status as of the export: a matching session row if one exists,
            // otherwise the candidate is a raw grid slot.
            let current_status = sessions
                .iter()
                .find(|s| s.tutor_id == tutor && s.date == date && s.time == time)
                .map(|s| s.status)
                .unwrap_or(SessionStatus::Available);

            let student_bookings: Vec<Session> = sessions
                .into_iter()
                .filter(|s| s.involves_student(&student))
                .collect();

            match validate::can_book(
                &candidate,
                current_status,
                now,
                &student_bookings,
                &BookingConstraints::default(),
                tz,
            ) {
                Ok(()) => println!("OK: slot is bookable"),
                Err(kind) => {
                    println!("REJECTED: {}", kind);
                    process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn read_availability(path: &str) -> Result<WeeklyAvailability> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid availability JSON: {}", path))
}

fn read_sessions(path: &str) -> Result<Vec<Session>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid sessions JSON: {}", path))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", s))
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("Invalid time: {}", s))
}

fn parse_now(s: Option<&str>) -> Result<DateTime<Utc>> {
    match s {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid instant: {}", raw)),
        None => Ok(Utc::now()),
    }
}
