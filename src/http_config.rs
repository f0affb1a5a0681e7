//! HTTP client configuration module
//!
//! Centralized timeouts and connection settings for the auth and Zoom
//! integration clients. Requests are never retried automatically.

use crate::error::AppResult;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Total request timeout
    pub timeout: Duration,
    /// Idle pooled connections are dropped after this long
    pub pool_idle_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(45),
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl HttpConfig {
    /// Create default HTTP config
    pub fn new() -> Self {
        Self::default()
    }

    /// Login should fail fast
    pub fn auth() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            ..Self::default()
        }
    }

    /// Meeting creation goes through Zoom and can be slow
    pub fn integration() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
            ..Self::default()
        }
    }

    /// Build a reqwest client with this configuration
    pub fn build_client(&self) -> AppResult<Client> {
        Ok(ClientBuilder::new()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(2)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }
}
