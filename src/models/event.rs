// file: src/models/event.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::meeting::{CreatedMeeting, MeetingIdSource};

pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Event form contents before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    /// YYYY-MM-DD
    pub start_date: String,
    /// HH:MM
    pub start_time: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            start_date: String::new(),
            start_time: String::new(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Created,
    Error,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Created => "created",
            EventStatus::Error => "error",
        }
    }
}

/// Outcome of one submitted draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub start_date: String,
    pub start_time: String,
    pub duration_minutes: u32,
    pub description: Option<String>,
    pub meeting_id: Option<String>,
    pub join_url: Option<String>,
    pub start_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: EventStatus,
    pub error: Option<String>,
    pub meeting_id_synthesized: bool,
}

impl EventRecord {
    pub fn created(draft: &EventDraft, meeting: CreatedMeeting) -> Self {
        Self {
            meeting_id_synthesized: meeting.id_source == MeetingIdSource::Synthesized,
            meeting_id: Some(meeting.meeting_id),
            join_url: Some(meeting.join_url),
            start_url: Some(meeting.start_url),
            status: EventStatus::Created,
            error: None,
            ..Self::base(draft)
        }
    }

    pub fn failed(draft: &EventDraft, error: impl Into<String>) -> Self {
        Self {
            status: EventStatus::Error,
            error: Some(error.into()),
            ..Self::base(draft)
        }
    }

    fn base(draft: &EventDraft) -> Self {
        Self {
            id: format!("event-{}", uuid::Uuid::new_v4()),
            title: draft.title.clone(),
            start_date: draft.start_date.clone(),
            start_time: draft.start_time.clone(),
            duration_minutes: draft.duration_minutes,
            description: draft
                .description
                .clone()
                .filter(|d| !d.trim().is_empty()),
            meeting_id: None,
            join_url: None,
            start_url: None,
            created_at: Utc::now(),
            status: EventStatus::Error,
            error: None,
            meeting_id_synthesized: false,
        }
    }

    pub fn is_created(&self) -> bool {
        self.status == EventStatus::Created
    }
}

/// Form fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventField {
    Title,
    StartDate,
    StartTime,
    Duration,
}

impl EventField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventField::Title => "title",
            EventField::StartDate => "startDate",
            EventField::StartTime => "startTime",
            EventField::Duration => "duration",
        }
    }
}

/// Field to message map. Empty means the draft is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<EventField, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: EventField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: EventField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: EventField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> Vec<EventField> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.as_str(), msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EventDraft {
        EventDraft {
            title: "Standup".to_string(),
            start_date: "2030-01-15".to_string(),
            start_time: "09:00".to_string(),
            duration_minutes: 30,
            description: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_default_draft() {
        let draft = EventDraft::default();
        assert!(draft.title.is_empty());
        assert_eq!(draft.duration_minutes, 60);
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_created_record_carries_meeting() {
        let meeting = CreatedMeeting {
            meeting_id: "81234567890".to_string(),
            join_url: "https://zoom.us/j/81234567890".to_string(),
            start_url: "https://zoom.us/s/81234567890".to_string(),
            id_source: MeetingIdSource::Backend,
        };

        let record = EventRecord::created(&draft(), meeting);
        assert!(record.is_created());
        assert!(record.id.starts_with("event-"));
        assert_eq!(record.meeting_id.as_deref(), Some("81234567890"));
        assert!(!record.meeting_id_synthesized);
        assert!(record.description.is_none());
        assert!(record.error.is_none());
    }

    #[test]
    fn test_failed_record_has_no_meeting() {
        let record = EventRecord::failed(&draft(), "Failed to create meeting");
        assert_eq!(record.status, EventStatus::Error);
        assert!(record.meeting_id.is_none());
        assert!(record.join_url.is_none());
        assert!(record.start_url.is_none());
        assert_eq!(record.error.as_deref(), Some("Failed to create meeting"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EventStatus::Created).unwrap(), "\"created\"");
        assert_eq!(EventStatus::Error.as_str(), "error");
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.insert(EventField::Duration, "Minimum duration is 15 minutes");
        errors.insert(EventField::Title, "Title is required");
        assert_eq!(
            errors.to_string(),
            "title: Title is required; duration: Minimum duration is 15 minutes"
        );
        assert_eq!(errors.fields(), vec![EventField::Title, EventField::Duration]);
    }
}
