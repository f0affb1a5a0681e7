//! Event form validation
//!
//! Pure checks over an [`EventDraft`]. Date and time are interpreted in the
//! configured timezone and compared against the `now` passed in.

use crate::models::{EventDraft, EventField, ValidationErrors};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const MIN_DURATION_MINUTES: u32 = 15;
pub const MAX_DURATION_MINUTES: u32 = 1440;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const DEFAULT_TIME: &str = "00:00";

pub fn validate_event(draft: &EventDraft, now: DateTime<Utc>, timezone: Tz) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.title.trim().is_empty() {
        errors.insert(EventField::Title, "Title is required");
    }

    let date = draft.start_date.trim();
    let time = draft.start_time.trim();

    let parsed_time = if time.is_empty() {
        errors.insert(EventField::StartTime, "Time is required");
        parse_time(DEFAULT_TIME)
    } else {
        let parsed = parse_time(time);
        if parsed.is_none() {
            errors.insert(EventField::StartTime, "Invalid time");
        }
        parsed
    };

    if date.is_empty() {
        errors.insert(EventField::StartDate, "Date is required");
    } else {
        match (NaiveDate::parse_from_str(date, DATE_FORMAT), parsed_time) {
            (Err(_), _) => errors.insert(EventField::StartDate, "Invalid date"),
            (Ok(_), None) => {}
            (Ok(d), Some(t)) => match localize(d.and_time(t), timezone) {
                Some(start) if start > now => {}
                Some(_) => errors.insert(EventField::StartDate, "Date and time must be in the future"),
                None => errors.insert(
                    EventField::StartTime,
                    "Time does not exist in the configured timezone",
                ),
            },
        }
    }

    if draft.duration_minutes < MIN_DURATION_MINUTES {
        errors.insert(EventField::Duration, "Minimum duration is 15 minutes");
    } else if draft.duration_minutes > MAX_DURATION_MINUTES {
        errors.insert(EventField::Duration, "Maximum duration is 24 hours (1440 minutes)");
    }

    errors
}

/// UTC instant of a draft's start. `None` if date or time do not parse.
pub fn start_instant(draft: &EventDraft, timezone: Tz) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(draft.start_date.trim(), DATE_FORMAT).ok()?;
    let time = parse_time(draft.start_time.trim())?;
    localize(date.and_time(time), timezone)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

/// Ambiguous local times (DST fall-back) resolve to the earlier instant.
fn localize(local: NaiveDateTime, timezone: Tz) -> Option<DateTime<Utc>> {
    timezone
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
