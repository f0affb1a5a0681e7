// file: src/models/connection.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Linked Zoom account of the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl ConnectionStatus {
    pub fn display_name(&self) -> &str {
        non_empty_or_na(self.user_name.as_deref())
    }

    pub fn display_email(&self) -> &str {
        non_empty_or_na(self.user_email.as_deref())
    }

    pub fn display_account_type(&self) -> &str {
        non_empty_or_na(Some(self.account_type.as_str()))
    }
}

fn non_empty_or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "N/A",
    }
}

/// Status endpoint body. A present `data` object means the account is linked,
/// whatever shape its fields have.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub data: Option<Value>,
}

impl StatusPayload {
    pub fn into_status(self) -> Option<ConnectionStatus> {
        let data = self.data?;
        let fields = data.as_object()?;

        Some(ConnectionStatus {
            is_connected: true,
            user_id: lenient_string(fields, "userId").unwrap_or_default(),
            account_id: lenient_string(fields, "accountId").unwrap_or_default(),
            account_type: lenient_string(fields, "accountType").unwrap_or_default(),
            user_email: lenient_string(fields, "userEmail"),
            user_name: lenient_string(fields, "userName"),
        })
    }
}

/// Strings as-is, numbers and booleans in their JSON form, anything else absent.
fn lenient_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Result of the last status refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionSnapshot {
    pub status: Option<ConnectionStatus>,
    pub error: Option<String>,
}

impl ConnectionSnapshot {
    pub fn connected(status: ConnectionStatus) -> Self {
        Self {
            status: Some(status),
            error: None,
        }
    }

    pub fn unconnected() -> Self {
        Self::default()
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: None,
            error: Some(error.into()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status.as_ref().map(|s| s.is_connected).unwrap_or(false)
    }
}

/// First half of the connect flow, kept until the provider redirects back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConnect {
    pub state: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl PendingConnect {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            state: uuid::Uuid::new_v4().simple().to_string(),
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at > ttl
    }
}

/// Where the client must navigate to authorize the Zoom account.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectRedirect {
    pub url: Url,
    pub state: String,
}
