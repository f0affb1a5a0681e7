// Data types shared by the session, connection and submission layers

// Declare modules
pub mod connection;
pub mod event;
pub mod meeting;
pub mod session;

// Re-export so callers can `use crate::models::Session` etc.
pub use connection::{ConnectRedirect, ConnectionSnapshot, ConnectionStatus, PendingConnect, StatusPayload};
pub use event::{EventDraft, EventField, EventRecord, EventStatus, ValidationErrors, DEFAULT_DURATION_MINUTES};
pub use meeting::{CreateMeetingRequest, CreatedMeeting, MeetingIdSource};
pub use session::{LoginRequest, Session};
