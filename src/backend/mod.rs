// Remote collaborators: auth backend and Zoom integration backend.
// Everything that leaves the process goes through `IntegrationBackend`.

use crate::error::AppResult;
use crate::models::{ConnectionStatus, CreateMeetingRequest, LoginRequest, Session};
use async_trait::async_trait;
use serde_json::Value;

pub mod http;

pub use http::HttpBackend;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait IntegrationBackend: Send + Sync {
    /// Exchanges credentials for a session. Rejections surface as `AppError::Auth`
    /// carrying the backend's message.
    async fn login(&self, request: &LoginRequest) -> AppResult<Session>;

    /// `Ok(None)` when the account is not linked or the backend refuses the query.
    async fn connection_status(&self, credential: &str) -> AppResult<Option<ConnectionStatus>>;

    /// Raw success payload of the meeting endpoint. Non-success responses
    /// surface as `AppError::Backend`.
    async fn create_meeting(&self, credential: &str, request: &CreateMeetingRequest) -> AppResult<Value>;
}
