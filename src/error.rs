use crate::models::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid event: {0}")]
    Validation(ValidationErrors),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Zoom account is not connected")]
    NotConnected,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Stored state is malformed: {0}")]
    MalformedStoredState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("No connect flow is pending")]
    NoPendingConnect,

    #[error("Connect state does not match the pending request")]
    ConnectStateMismatch,

    #[error("Connect request expired")]
    ConnectExpired,
}

impl AppError {
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn malformed_state<S: Into<String>>(msg: S) -> Self {
        Self::MalformedStoredState(msg.into())
    }

    /// Errors the user has to act on (log in, connect Zoom) before retrying.
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated
                | Self::NotConnected
                | Self::Auth(_)
                | Self::NoPendingConnect
                | Self::ConnectStateMismatch
                | Self::ConnectExpired
        )
    }

    pub fn is_pii_safe(&self) -> bool {
        match self {
            Self::Database(_) | Self::Network(_) | Self::Anyhow(_) | Self::Serialization(_) => false,
            Self::MalformedStoredState(_) => false,
            Self::Validation(_)
            | Self::NotAuthenticated
            | Self::NotConnected
            | Self::Auth(_)
            | Self::Backend(_)
            | Self::Config(_)
            | Self::SubmissionInFlight
            | Self::NoPendingConnect
            | Self::ConnectStateMismatch
            | Self::ConnectExpired => true,
        }
    }

    /// Message suitable for showing to the user.
    pub fn to_safe_string(&self) -> String {
        if self.is_pii_safe() {
            match self {
                Self::Auth(msg) | Self::Backend(msg) => msg.clone(),
                _ => self.to_string(),
            }
        } else {
            match self {
                Self::Database(_) | Self::Anyhow(_) => "Local storage operation failed".to_string(),
                Self::Network(_) => "Network request failed".to_string(),
                Self::Serialization(_) => "Unexpected response from server".to_string(),
                Self::MalformedStoredState(_) => "Saved session was discarded".to_string(),
                _ => "Operation failed".to_string(),
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
