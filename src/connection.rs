//! Connection status tracker
//!
//! Caches whether the logged-in user has linked a Zoom account and drives
//! the connect flow. Connecting is two-phase: [`ConnectionTracker::initiate_connect`]
//! stores a correlating `state` token and hands back the authorization URL,
//! and [`ConnectionTracker::resume_connect`] checks the token the provider
//! sends back before refreshing the status.

use crate::backend::IntegrationBackend;
use crate::config::AppConfig;
use crate::database::{Database, PENDING_CONNECT_KEY};
use crate::error::{AppError, AppResult};
use crate::models::{ConnectRedirect, ConnectionSnapshot, PendingConnect};
use crate::session::SessionStore;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

pub const NOT_AUTHENTICATED: &str = "Not authenticated";
pub const STATUS_CHECK_FAILED: &str = "Failed to check connection status";

pub struct ConnectionTracker {
    session: Arc<SessionStore>,
    backend: Arc<dyn IntegrationBackend>,
    db: Database,
    connect_url: Url,
    redirect_uri: Url,
    state_ttl: chrono::Duration,
    snapshot: RwLock<ConnectionSnapshot>,
}

impl ConnectionTracker {
    pub fn new(
        config: &AppConfig,
        session: Arc<SessionStore>,
        backend: Arc<dyn IntegrationBackend>,
        db: Database,
    ) -> AppResult<Self> {
        Ok(Self {
            session,
            backend,
            db,
            connect_url: config.integration_endpoint("connect")?,
            redirect_uri: config.redirect_uri.clone(),
            state_ttl: config.connect_state_ttl,
            snapshot: RwLock::new(ConnectionSnapshot::unconnected()),
        })
    }

    /// Re-queries the status endpoint. Never fails: problems end up in the
    /// snapshot's `error`.
    pub async fn refresh(&self) -> ConnectionSnapshot {
        let snapshot = match self.session.access_token().await {
            None => {
                debug!("No session credential, skipping status query");
                ConnectionSnapshot::failed(NOT_AUTHENTICATED)
            }
            Some(token) => match self.backend.connection_status(&token).await {
                Ok(Some(status)) => {
                    info!("Zoom account {} is connected", status.account_id);
                    ConnectionSnapshot::connected(status)
                }
                Ok(None) => {
                    info!("Zoom account is not connected");
                    ConnectionSnapshot::unconnected()
                }
                Err(e) => {
                    warn!("Checking connection status failed: {}", e);
                    ConnectionSnapshot::failed(STATUS_CHECK_FAILED)
                }
            },
        };

        *self.snapshot.write().await = snapshot.clone();
        snapshot
    }

    /// Starts the connect flow for `user_id`. The caller navigates to the
    /// returned URL; control comes back through [`ConnectionTracker::resume_connect`].
    pub async fn initiate_connect(&self, user_id: &str) -> AppResult<ConnectRedirect> {
        let pending = PendingConnect::new(user_id);
        self.db
            .put_value(PENDING_CONNECT_KEY, &serde_json::to_string(&pending)?)
            .await?;

        let url = self.authorize_url(&pending);
        info!("Connect flow started for user '{}'", user_id);

        Ok(ConnectRedirect {
            url,
            state: pending.state,
        })
    }

    /// Finishes the connect flow once the provider redirected back with
    /// `returned_state`.
    pub async fn resume_connect(&self, returned_state: &str) -> AppResult<ConnectionSnapshot> {
        let Some(raw) = self.db.get_value(PENDING_CONNECT_KEY).await? else {
            return Err(AppError::NoPendingConnect);
        };
        // A pending request is single use, whatever the outcome
        self.db.remove_value(PENDING_CONNECT_KEY).await?;

        let pending: PendingConnect = match serde_json::from_str(&raw) {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Discarding stored connect request: {}", e);
                return Err(AppError::NoPendingConnect);
            }
        };

        if pending.state != returned_state {
            warn!("Connect state mismatch for user '{}'", pending.user_id);
            return Err(AppError::ConnectStateMismatch);
        }
        if pending.is_expired(self.state_ttl, Utc::now()) {
            warn!("Connect request for user '{}' expired", pending.user_id);
            return Err(AppError::ConnectExpired);
        }

        info!("Connect flow resumed for user '{}'", pending.user_id);
        Ok(self.refresh().await)
    }

    pub async fn pending_connect(&self) -> AppResult<Option<PendingConnect>> {
        Ok(self
            .db
            .get_value(PENDING_CONNECT_KEY)
            .await?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    /// Forgets the cached status, e.g. after logout.
    pub async fn reset(&self) {
        *self.snapshot.write().await = ConnectionSnapshot::unconnected();
    }

    pub async fn snapshot(&self) -> ConnectionSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.snapshot.read().await.is_connected()
    }

    fn authorize_url(&self, pending: &PendingConnect) -> Url {
        let mut url = self.connect_url.clone();
        url.query_pairs_mut()
            .append_pair("userId", &pending.user_id)
            .append_pair("redirectUri", self.redirect_uri.as_str())
            .append_pair("state", &pending.state);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockIntegrationBackend;
    use crate::models::{ConnectionStatus, Session};

    fn linked() -> ConnectionStatus {
        ConnectionStatus {
            is_connected: true,
            user_id: "zu-1".to_string(),
            account_id: "za-1".to_string(),
            account_type: "pro".to_string(),
            user_email: Some("ana@example.com".to_string()),
            user_name: Some("Ana".to_string()),
        }
    }

    async fn tracker_with(backend: MockIntegrationBackend, logged_in: bool) -> (ConnectionTracker, Database) {
        let mut backend = backend;
        if logged_in {
            backend.expect_login().returning(|_| Ok(Session::new("jwt-1", "Ana")));
        }
        let backend: Arc<dyn IntegrationBackend> = Arc::new(backend);
        let db = Database::in_memory().await.unwrap();
        let session = Arc::new(SessionStore::new(db.clone(), backend.clone()));
        if logged_in {
            session.login("ana@example.com", "pw").await.unwrap();
        }
        let tracker = ConnectionTracker::new(&AppConfig::default(), session, backend, db.clone()).unwrap();
        (tracker, db)
    }

    #[tokio::test]
    async fn test_refresh_without_session_skips_network() {
        let mut backend = MockIntegrationBackend::new();
        backend.expect_connection_status().times(0);
        let (tracker, _db) = tracker_with(backend, false).await;

        let snapshot = tracker.refresh().await;
        assert!(!snapshot.is_connected());
        assert_eq!(snapshot.error.as_deref(), Some(NOT_AUTHENTICATED));
    }

    #[tokio::test]
    async fn test_refresh_connected() {
        let mut backend = MockIntegrationBackend::new();
        backend
            .expect_connection_status()
            .times(1)
            .returning(|token| {
                assert_eq!(token, "jwt-1");
                Ok(Some(linked()))
            });
        let (tracker, _db) = tracker_with(backend, true).await;

        let snapshot = tracker.refresh().await;
        assert!(snapshot.is_connected());
        assert!(snapshot.error.is_none());
        assert!(tracker.is_connected().await);
    }

    #[tokio::test]
    async fn test_refresh_not_linked() {
        let mut backend = MockIntegrationBackend::new();
        backend.expect_connection_status().returning(|_| Ok(None));
        let (tracker, _db) = tracker_with(backend, true).await;

        let snapshot = tracker.refresh().await;
        assert!(!snapshot.is_connected());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_transport_failure_is_generic() {
        let mut backend = MockIntegrationBackend::new();
        backend
            .expect_connection_status()
            .returning(|_| Err(AppError::backend("connection refused")));
        let (tracker, _db) = tracker_with(backend, true).await;

        let snapshot = tracker.refresh().await;
        assert!(!snapshot.is_connected());
        assert_eq!(snapshot.error.as_deref(), Some(STATUS_CHECK_FAILED));
    }

    #[tokio::test]
    async fn test_initiate_connect_builds_authorize_url() {
        let (tracker, _db) = tracker_with(MockIntegrationBackend::new(), false).await;

        let redirect = tracker.initiate_connect("demo-user").await.unwrap();
        let pairs: Vec<(String, String)> = redirect.url.query_pairs().into_owned().collect();

        assert_eq!(redirect.url.path(), "/integrations/zoom/connect");
        assert!(pairs.contains(&("userId".to_string(), "demo-user".to_string())));
        assert!(pairs.contains(&("redirectUri".to_string(), "http://localhost:8080/".to_string())));
        assert!(pairs.contains(&("state".to_string(), redirect.state.clone())));

        let pending = tracker.pending_connect().await.unwrap().unwrap();
        assert_eq!(pending.state, redirect.state);
    }

    #[tokio::test]
    async fn test_resume_connect_with_matching_state() {
        let mut backend = MockIntegrationBackend::new();
        backend.expect_connection_status().times(1).returning(|_| Ok(Some(linked())));
        let (tracker, _db) = tracker_with(backend, true).await;

        let redirect = tracker.initiate_connect("demo-user").await.unwrap();
        let snapshot = tracker.resume_connect(&redirect.state).await.unwrap();

        assert!(snapshot.is_connected());
        assert!(tracker.pending_connect().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resume_connect_with_wrong_state() {
        let mut backend = MockIntegrationBackend::new();
        backend.expect_connection_status().times(0);
        let (tracker, _db) = tracker_with(backend, true).await;

        tracker.initiate_connect("demo-user").await.unwrap();
        let err = tracker.resume_connect("forged").await.unwrap_err();

        assert!(matches!(err, AppError::ConnectStateMismatch));
        assert!(tracker.pending_connect().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resume_connect_expired() {
        let (tracker, db) = tracker_with(MockIntegrationBackend::new(), false).await;

        let mut pending = PendingConnect::new("demo-user");
        pending.created_at = Utc::now() - chrono::Duration::hours(1);
        db.put_value(PENDING_CONNECT_KEY, &serde_json::to_string(&pending).unwrap())
            .await
            .unwrap();

        let err = tracker.resume_connect(&pending.state).await.unwrap_err();
        assert!(matches!(err, AppError::ConnectExpired));
    }

    #[tokio::test]
    async fn test_resume_connect_without_pending() {
        let (tracker, _db) = tracker_with(MockIntegrationBackend::new(), false).await;
        let err = tracker.resume_connect("anything").await.unwrap_err();
        assert!(matches!(err, AppError::NoPendingConnect));
    }
}
