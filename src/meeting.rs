//! Meeting request client
//!
//! Creates Zoom meetings through the integration backend and normalizes the
//! answer into a [`CreatedMeeting`].

use crate::backend::IntegrationBackend;
use crate::config::{render_template, AppConfig};
use crate::error::{AppError, AppResult};
use crate::models::{CreateMeetingRequest, CreatedMeeting, MeetingIdSource};
use crate::session::SessionStore;
use crate::utils::{extract_meeting_id, logging};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

pub struct MeetingClient {
    session: Arc<SessionStore>,
    backend: Arc<dyn IntegrationBackend>,
    join_url_template: String,
    start_url_template: String,
}

impl MeetingClient {
    pub fn new(config: &AppConfig, session: Arc<SessionStore>, backend: Arc<dyn IntegrationBackend>) -> Self {
        Self {
            session,
            backend,
            join_url_template: config.join_url_template.clone(),
            start_url_template: config.start_url_template.clone(),
        }
    }

    /// Requires a logged-in session; without one nothing is sent.
    pub async fn create_meeting(
        &self,
        topic: &str,
        start: DateTime<Utc>,
        duration_minutes: u32,
    ) -> AppResult<CreatedMeeting> {
        let token = self
            .session
            .access_token()
            .await
            .ok_or(AppError::NotAuthenticated)?;

        let started = Instant::now();
        let request = CreateMeetingRequest::new(topic, start, duration_minutes);
        info!("Creating meeting '{}' at {}", request.topic, request.start_time);

        let payload = self.backend.create_meeting(&token, &request).await?;

        let (meeting_id, id_source) = match extract_meeting_id(&payload) {
            Some(id) => (id, MeetingIdSource::Backend),
            None => {
                // TODO: drop the fallback once the meeting endpoint always returns an id
                let id = format!("meeting-{}", Utc::now().timestamp_millis());
                warn!("Meeting payload carried no identifier, using local id {}", id);
                (id, MeetingIdSource::Synthesized)
            }
        };

        logging::log_meeting_created(&request.topic, &meeting_id, started.elapsed().as_millis() as u64);

        Ok(CreatedMeeting {
            join_url: render_template(&self.join_url_template, &meeting_id),
            start_url: render_template(&self.start_url_template, &meeting_id),
            meeting_id,
            id_source,
        })
    }
}
