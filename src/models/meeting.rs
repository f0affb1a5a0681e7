// file: src/models/meeting.rs
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Form-encoded body of the meeting endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub topic: String,
    /// ISO-8601, UTC, millisecond precision.
    pub start_time: String,
    pub duration: u32,
}

impl CreateMeetingRequest {
    pub fn new(topic: impl Into<String>, start: DateTime<Utc>, duration: u32) -> Self {
        Self {
            topic: topic.into(),
            start_time: start.to_rfc3339_opts(SecondsFormat::Millis, true),
            duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingIdSource {
    /// Identifier found in the backend payload.
    Backend,
    /// Backend payload had no identifier; generated locally.
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedMeeting {
    pub meeting_id: String,
    pub join_url: String,
    pub start_url: String,
    pub id_source: MeetingIdSource,
}
