// HTTP implementation of the integration backend.
// Auth: JSON login. Zoom integration: bearer-authenticated status and
// form-encoded meeting creation.

use super::IntegrationBackend;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::{ConnectionStatus, CreateMeetingRequest, LoginRequest, Session, StatusPayload};
use crate::utils::{first_error_message, logging};
use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client, Response};
use serde_json::Value;
use url::Url;

const LOGIN_FAILED: &str = "Login failed";
const MEETING_FAILED: &str = "Failed to create meeting";

pub struct HttpBackend {
    auth_client: Client,
    integration_client: Client,
    login_url: Url,
    status_url: Url,
    meeting_url: Url,
    content_language: String,
}

impl HttpBackend {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            auth_client: config.auth_http.build_client()?,
            integration_client: config.integration_http.build_client()?,
            login_url: config.auth_login_url.clone(),
            status_url: config.integration_endpoint("status")?,
            meeting_url: config.integration_endpoint("meeting")?,
            content_language: config.content_language.clone(),
        })
    }
}

#[async_trait]
impl IntegrationBackend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> AppResult<Session> {
        let response = self
            .auth_client
            .post(self.login_url.clone())
            .header(header::CONTENT_LANGUAGE, &self.content_language)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                logging::log_network_error("Login", &e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let payload = read_json(response).await.unwrap_or(Value::Null);
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(LOGIN_FAILED)
                .to_string();
            debug!("Login rejected with status {}", status);
            return Err(AppError::auth(message));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<Session>(&body)?)
    }

    async fn connection_status(&self, credential: &str) -> AppResult<Option<ConnectionStatus>> {
        let response = self
            .integration_client
            .get(self.status_url.clone())
            .bearer_auth(credential)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                logging::log_network_error("Connection status", &e);
                e
            })?;

        if !response.status().is_success() {
            debug!("Status endpoint answered {}, treating as not connected", response.status());
            return Ok(None);
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice::<StatusPayload>(&body) {
            Ok(payload) => Ok(payload.into_status()),
            Err(e) => {
                debug!("Status body carried no data object: {}", e);
                Ok(None)
            }
        }
    }

    async fn create_meeting(&self, credential: &str, request: &CreateMeetingRequest) -> AppResult<Value> {
        let duration = request.duration.to_string();
        let form = [
            ("topic", request.topic.as_str()),
            ("startTime", request.start_time.as_str()),
            ("duration", duration.as_str()),
        ];

        let response = self
            .integration_client
            .post(self.meeting_url.clone())
            .bearer_auth(credential)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                logging::log_network_error("Create meeting", &e);
                e
            })?;

        let success = response.status().is_success();
        let status = response.status();
        let payload = read_json(response).await?;

        if !success {
            debug!("Meeting endpoint answered {}", status);
            let message = first_error_message(&payload).unwrap_or_else(|| MEETING_FAILED.to_string());
            return Err(AppError::backend(message));
        }

        Ok(payload)
    }
}

/// Reads the body as JSON. Plain-text bodies become `{"message": <text>}`.
async fn read_json(response: Response) -> AppResult<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "message": text.trim() })))
}
