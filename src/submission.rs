//! Event submission flow
//!
//! `Idle -> Validating -> Submitting -> Idle`, one attempt at a time. A
//! submission is refused before validation when Zoom is not connected, and
//! while another one is still in flight.

use crate::connection::ConnectionTracker;
use crate::error::{AppError, AppResult};
use crate::ledger::EventLedger;
use crate::meeting::MeetingClient;
use crate::models::{EventDraft, EventField, EventRecord, ValidationErrors};
use crate::utils::normalize_title;
use crate::validation::{start_instant, validate_event};
use chrono::Utc;
use chrono_tz::Tz;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
}

pub struct EventSubmitter {
    connection: Arc<ConnectionTracker>,
    meetings: Arc<MeetingClient>,
    timezone: Tz,
    state: Mutex<SubmissionState>,
    ledger: RwLock<EventLedger>,
}

impl EventSubmitter {
    pub fn new(connection: Arc<ConnectionTracker>, meetings: Arc<MeetingClient>, timezone: Tz) -> Self {
        Self {
            connection,
            meetings,
            timezone,
            state: Mutex::new(SubmissionState::Idle),
            ledger: RwLock::new(EventLedger::new()),
        }
    }

    /// Validates `draft`, asks for a meeting and records the outcome.
    ///
    /// Both a created meeting and a failed meeting request produce a record
    /// in the ledger and `Ok(record)`. Errors are returned only when the
    /// attempt never reached the backend.
    pub async fn submit(&self, draft: EventDraft) -> AppResult<EventRecord> {
        if !self.connection.is_connected().await {
            return Err(AppError::NotConnected);
        }

        let flight = InFlight::begin(&self.state)?;

        let errors = validate_event(&draft, Utc::now(), self.timezone);
        if !errors.is_empty() {
            debug!("Draft rejected: {}", errors);
            return Err(AppError::Validation(errors));
        }
        let Some(start) = start_instant(&draft, self.timezone) else {
            let mut errors = ValidationErrors::new();
            errors.insert(EventField::StartDate, "Invalid date");
            return Err(AppError::Validation(errors));
        };

        flight.advance(SubmissionState::Submitting);

        let draft = EventDraft {
            title: normalize_title(&draft.title),
            ..draft
        };
        let topic = draft.title.as_str();
        let record = match self
            .meetings
            .create_meeting(topic, start, draft.duration_minutes)
            .await
        {
            Ok(meeting) => {
                info!("Event '{}' created with meeting {}", topic, meeting.meeting_id);
                EventRecord::created(&draft, meeting)
            }
            Err(e) => {
                warn!("Meeting creation for '{}' failed: {}", topic, e);
                EventRecord::failed(&draft, e.to_safe_string())
            }
        };

        self.ledger.write().await.prepend(record.clone());
        Ok(record)
    }

    pub fn state(&self) -> SubmissionState {
        *lock(&self.state)
    }

    pub fn is_submitting(&self) -> bool {
        self.state() != SubmissionState::Idle
    }

    /// Newest first.
    pub async fn records(&self) -> Vec<EventRecord> {
        self.ledger.read().await.records()
    }

    pub async fn event_count(&self) -> usize {
        self.ledger.read().await.len()
    }
}

fn lock(state: &Mutex<SubmissionState>) -> MutexGuard<'_, SubmissionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a submission as in flight; back to `Idle` when dropped, including
/// when the submitting future is cancelled.
struct InFlight<'a> {
    state: &'a Mutex<SubmissionState>,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a Mutex<SubmissionState>) -> AppResult<Self> {
        let mut current = lock(state);
        if *current != SubmissionState::Idle {
            return Err(AppError::SubmissionInFlight);
        }
        *current = SubmissionState::Validating;
        Ok(Self { state })
    }

    fn advance(&self, next: SubmissionState) {
        *lock(self.state) = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock(self.state) = SubmissionState::Idle;
    }
}
