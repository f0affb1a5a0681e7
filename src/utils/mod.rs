use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

pub mod logging;

/// Zoom meeting numbers are 9 to 12 digits.
fn meeting_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{9,12})\b").expect("meeting number pattern is valid"))
}

/// Finds the meeting identifier in a meeting endpoint success payload.
///
/// Looks at `meetingId` / `id`, then `data.meetingId` / `data.id`, then the
/// first meeting number mentioned in `message`.
pub fn extract_meeting_id(payload: &Value) -> Option<String> {
    let direct = |v: &Value| {
        ["meetingId", "id"]
            .iter()
            .find_map(|key| v.get(key).and_then(id_value))
    };

    direct(payload)
        .or_else(|| payload.get("data").and_then(direct))
        .or_else(|| {
            payload
                .get("message")
                .and_then(Value::as_str)
                .and_then(extract_meeting_number)
        })
}

pub fn extract_meeting_number(text: &str) -> Option<String> {
    meeting_number_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First entry of an `errors` array, falling back to `message`.
pub fn first_error_message(payload: &Value) -> Option<String> {
    let from_errors = payload
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|first| match first {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => first.get("message").and_then(Value::as_str).map(str::to_string),
            _ => None,
        });

    from_errors
        .or_else(|| payload.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|msg| !msg.trim().is_empty())
}

/// "45 min", "1h", "1h 30min"
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} min", minutes);
    }
    let hours = minutes / 60;
    let remaining = minutes % 60;
    if remaining > 0 {
        format!("{}h {}min", hours, remaining)
    } else {
        format!("{}h", hours)
    }
}

/// Short "dd/mm/yyyy hh:mm" rendering of a form date and time.
pub fn format_start(date: &str, time: &str) -> String {
    match (
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d"),
        NaiveTime::parse_from_str(time.trim(), "%H:%M"),
    ) {
        (Ok(d), Ok(t)) => format!("{} {}", d.format("%d/%m/%Y"), t.format("%H:%M")),
        _ => format!("{} {}", date, time).trim().to_string(),
    }
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_string()
}
