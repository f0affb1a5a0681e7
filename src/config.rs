//! Application configuration
//!
//! Settings come from `ZOOM_EVENTS_*` environment variables with defaults
//! pointing at the development backends.

use crate::error::{AppError, AppResult};
use crate::http_config::HttpConfig;
use chrono_tz::Tz;
use log::info;
use std::env;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_AUTH_URL: &str = "https://multidrop-dev.ew.r.appspot.com/auth/v2/login";
pub const DEFAULT_INTEGRATION_URL: &str = "http://localhost:8080/integrations/zoom";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080";
pub const DEFAULT_JOIN_URL_TEMPLATE: &str = "https://zoom.us/j/{id}";
pub const DEFAULT_START_URL_TEMPLATE: &str = "https://zoom.us/s/{id}";
pub const DEFAULT_CONTENT_LANGUAGE: &str = "DE";
pub const DEFAULT_CONNECT_TTL_MINUTES: i64 = 15;

const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Full URL of the login endpoint
    pub auth_login_url: Url,
    /// Base of the Zoom integration endpoints (`/status`, `/meeting`, `/connect`)
    pub integration_base_url: Url,
    /// Where the provider sends the user after authorizing
    pub redirect_uri: Url,
    pub content_language: String,
    /// Timezone the event form's date and time are entered in
    pub timezone: Tz,
    pub storage_path: PathBuf,
    pub join_url_template: String,
    pub start_url_template: String,
    pub connect_state_ttl: chrono::Duration,
    pub auth_http: HttpConfig,
    pub integration_http: HttpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth_login_url: parse_url("auth URL", DEFAULT_AUTH_URL).expect("default auth URL is valid"),
            integration_base_url: parse_url("integration URL", DEFAULT_INTEGRATION_URL)
                .expect("default integration URL is valid"),
            redirect_uri: parse_url("redirect URI", DEFAULT_REDIRECT_URI).expect("default redirect URI is valid"),
            content_language: DEFAULT_CONTENT_LANGUAGE.to_string(),
            timezone: Tz::UTC,
            storage_path: default_storage_path(),
            join_url_template: DEFAULT_JOIN_URL_TEMPLATE.to_string(),
            start_url_template: DEFAULT_START_URL_TEMPLATE.to_string(),
            connect_state_ttl: chrono::Duration::minutes(DEFAULT_CONNECT_TTL_MINUTES),
            auth_http: HttpConfig::auth(),
            integration_http: HttpConfig::integration(),
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the environment and validates it.
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(value) = env_var("ZOOM_EVENTS_AUTH_URL") {
            config.auth_login_url = parse_url("ZOOM_EVENTS_AUTH_URL", &value)?;
        }
        if let Some(value) = env_var("ZOOM_EVENTS_INTEGRATION_URL") {
            config.integration_base_url = parse_url("ZOOM_EVENTS_INTEGRATION_URL", &value)?;
        }
        if let Some(value) = env_var("ZOOM_EVENTS_REDIRECT_URI") {
            config.redirect_uri = parse_url("ZOOM_EVENTS_REDIRECT_URI", &value)?;
        }
        if let Some(value) = env_var("ZOOM_EVENTS_CONTENT_LANGUAGE") {
            config.content_language = value;
        }
        if let Some(value) = env_var("ZOOM_EVENTS_TIMEZONE") {
            config.timezone = value
                .parse::<Tz>()
                .map_err(|e| AppError::config(format!("ZOOM_EVENTS_TIMEZONE: {}", e)))?;
        }
        if let Some(value) = env_var("ZOOM_EVENTS_DB_PATH") {
            config.storage_path = PathBuf::from(value);
        }
        if let Some(value) = env_var("ZOOM_EVENTS_JOIN_URL_TEMPLATE") {
            config.join_url_template = value;
        }
        if let Some(value) = env_var("ZOOM_EVENTS_START_URL_TEMPLATE") {
            config.start_url_template = value;
        }
        if let Some(value) = env_var("ZOOM_EVENTS_CONNECT_TTL_MINUTES") {
            let minutes: i64 = value.parse().map_err(|_| {
                AppError::config(format!("ZOOM_EVENTS_CONNECT_TTL_MINUTES must be a number, got '{}'", value))
            })?;
            config.connect_state_ttl = chrono::Duration::try_minutes(minutes).ok_or_else(|| {
                AppError::config(format!("ZOOM_EVENTS_CONNECT_TTL_MINUTES is out of range: {}", minutes))
            })?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// URL of an endpoint below the integration base, e.g. `status`.
    pub fn integration_endpoint(&self, path: &str) -> AppResult<Url> {
        let base = self.integration_base_url.as_str().trim_end_matches('/');
        parse_url("integration endpoint", &format!("{}/{}", base, path.trim_start_matches('/')))
    }
}

/// Validates application configuration
///
/// # Returns
///
/// * `Ok(())` - every URL is http(s), templates contain `{id}` and the
///   connect TTL is positive
/// * `Err(AppError::Config)` - otherwise
pub fn validate_config(config: &AppConfig) -> AppResult<()> {
    info!("Validating configuration");

    for (name, url) in [
        ("auth URL", &config.auth_login_url),
        ("integration URL", &config.integration_base_url),
        ("redirect URI", &config.redirect_uri),
    ] {
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(AppError::config(format!(
                "{} must use http or https, got '{}'",
                name,
                url.scheme()
            )));
        }
    }

    for (name, template) in [
        ("join URL template", &config.join_url_template),
        ("start URL template", &config.start_url_template),
    ] {
        if !template.contains(ID_PLACEHOLDER) {
            return Err(AppError::config(format!("{} must contain {}", name, ID_PLACEHOLDER)));
        }
    }

    if config.connect_state_ttl <= chrono::Duration::zero() {
        return Err(AppError::config("connect state TTL must be positive"));
    }

    Ok(())
}

/// Substitutes a meeting identifier into a URL template.
pub fn render_template(template: &str, meeting_id: &str) -> String {
    template.replace(ID_PLACEHOLDER, meeting_id)
}

pub fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zoom-events")
        .join("zoom-events.db")
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_url(name: &str, value: &str) -> AppResult<Url> {
    Url::parse(value).map_err(|e| AppError::config(format!("{} '{}' is invalid: {}", name, value, e)))
}
