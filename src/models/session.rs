// file: src/models/session.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Body sent to the auth backend.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated user as returned by the auth backend.
///
/// Fields the client does not use are kept in `extra` so the stored session
/// round-trips whatever the backend sent.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            first_name: first_name.into(),
            profile_image_url: None,
            extra: Map::new(),
        }
    }

    /// Bearer credential, if it is usable.
    pub fn credential(&self) -> Option<&str> {
        let token = self.access_token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("profile_image_url", &self.profile_image_url)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}
