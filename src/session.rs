//! Session store
//!
//! Holds the authenticated user's session in memory and mirrors it to the
//! `user` key of the local database so it survives restarts. One store is
//! constructed per process and shared by `Arc` with every collaborator that
//! needs the credential.

use crate::backend::IntegrationBackend;
use crate::database::{Database, SESSION_KEY};
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, Session};
use crate::utils::logging;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct SessionStore {
    db: Database,
    backend: Arc<dyn IntegrationBackend>,
    current: RwLock<Option<Arc<Session>>>,
    last_error: RwLock<Option<String>>,
}

impl SessionStore {
    /// Empty store; call [`SessionStore::hydrate`] to restore a saved session.
    pub fn new(db: Database, backend: Arc<dyn IntegrationBackend>) -> Self {
        Self {
            db,
            backend,
            current: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    /// Restores the persisted session. A stored value that does not parse is
    /// discarded and removed from storage.
    pub async fn hydrate(&self) -> AppResult<Option<Arc<Session>>> {
        let Some(raw) = self.db.get_value(SESSION_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                let session = Arc::new(session);
                *self.current.write().await = Some(session.clone());
                info!("Restored session for '{}'", session.first_name);
                Ok(Some(session))
            }
            Err(e) => {
                let err = AppError::malformed_state(e.to_string());
                warn!("Discarding stored session: {}", err);
                self.db.remove_value(SESSION_KEY).await?;
                *self.current.write().await = None;
                Ok(None)
            }
        }
    }

    /// Logs in against the auth backend. On failure any previous session is
    /// kept and the message is available from [`SessionStore::last_error`].
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Arc<Session>> {
        *self.last_error.write().await = None;

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let session = match self.backend.login(&request).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Login failed: {}", e);
                *self.last_error.write().await = Some(e.to_safe_string());
                return Err(e);
            }
        };

        if session.credential().is_none() {
            let err = AppError::auth("Login response did not contain an access token");
            *self.last_error.write().await = Some(err.to_safe_string());
            return Err(err);
        }

        let serialized = serde_json::to_string(&session)?;
        let session = Arc::new(session);
        {
            // Storage and memory change under one lock so they agree on the last login
            let mut current = self.current.write().await;
            self.db.put_value(SESSION_KEY, &serialized).await?;
            *current = Some(session.clone());
        }
        logging::log_auth_event("Logged in", &session.first_name);

        Ok(session)
    }

    /// Clears the session from storage, then from memory. If storage cannot
    /// be cleared the session stays in place.
    pub async fn logout(&self) -> AppResult<()> {
        let previous = {
            let mut current = self.current.write().await;
            self.db.remove_value(SESSION_KEY).await?;
            current.take()
        };
        *self.last_error.write().await = None;

        if let Some(session) = previous {
            logging::log_auth_event("Logged out", &session.first_name);
        }
        Ok(())
    }

    pub async fn current(&self) -> Option<Arc<Session>> {
        self.current.read().await.clone()
    }

    /// Bearer credential of the current session, if it is usable.
    pub async fn access_token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .and_then(|s| s.credential().map(str::to_string))
    }

    pub async fn is_authenticated(&self) -> bool {
        self.access_token().await.is_some()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockIntegrationBackend;

    fn session(token: &str, name: &str) -> Session {
        Session::new(token, name)
    }

    async fn store_with(backend: MockIntegrationBackend) -> (SessionStore, Database) {
        let db = Database::in_memory().await.unwrap();
        (SessionStore::new(db.clone(), Arc::new(backend)), db)
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let mut backend = MockIntegrationBackend::new();
        backend
            .expect_login()
            .times(1)
            .returning(|request| {
                assert_eq!(request.email, "ana@example.com");
                Ok(Session::new("jwt-1", "Ana"))
            });
        let (store, db) = store_with(backend).await;

        let session = store.login(" ana@example.com ", "pw").await.unwrap();
        assert_eq!(session.first_name, "Ana");
        assert_eq!(store.access_token().await.as_deref(), Some("jwt-1"));

        let stored = db.get_value(SESSION_KEY).await.unwrap().unwrap();
        let stored: Session = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored.access_token, "jwt-1");
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_session() {
        let mut backend = MockIntegrationBackend::new();
        let mut calls = 0;
        backend.expect_login().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(session("jwt-1", "Ana"))
            } else {
                Err(AppError::auth("Invalid credentials"))
            }
        });
        let (store, db) = store_with(backend).await;

        store.login("ana@example.com", "pw").await.unwrap();
        let err = store.login("ana@example.com", "wrong").await.unwrap_err();

        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(store.last_error().await.as_deref(), Some("Invalid credentials"));
        assert_eq!(store.access_token().await.as_deref(), Some("jwt-1"));
        assert!(db.get_value(SESSION_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let mut backend = MockIntegrationBackend::new();
        backend.expect_login().returning(|_| Ok(session("", "Ana")));
        let (store, db) = store_with(backend).await;

        assert!(store.login("ana@example.com", "pw").await.is_err());
        assert!(!store.is_authenticated().await);
        assert!(db.get_value(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_storage() {
        let mut backend = MockIntegrationBackend::new();
        backend.expect_login().returning(|_| Ok(session("jwt-1", "Ana")));
        let (store, db) = store_with(backend).await;

        store.login("ana@example.com", "pw").await.unwrap();
        store.logout().await.unwrap();

        assert!(store.current().await.is_none());
        assert!(store.last_error().await.is_none());
        assert!(db.get_value(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_keeps_session_when_storage_fails() {
        let mut backend = MockIntegrationBackend::new();
        backend.expect_login().returning(|_| Ok(session("jwt-1", "Ana")));
        let (store, db) = store_with(backend).await;

        store.login("ana@example.com", "pw").await.unwrap();
        db.pool.close().await;

        assert!(store.logout().await.is_err());
        assert_eq!(store.access_token().await.as_deref(), Some("jwt-1"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_logins_leave_memory_and_storage_in_agreement() {
        let mut backend = MockIntegrationBackend::new();
        backend
            .expect_login()
            .returning(|request| Ok(session(&format!("jwt-{}", request.email), "Ana")));
        let (store, db) = store_with(backend).await;
        let store = Arc::new(store);

        for _ in 0..20 {
            let (a, b) = (store.clone(), store.clone());
            let (first, second) = tokio::join!(
                tokio::spawn(async move { a.login("a@example.com", "pw").await }),
                tokio::spawn(async move { b.login("b@example.com", "pw").await }),
            );
            first.unwrap().unwrap();
            second.unwrap().unwrap();

            let stored = db.get_value(SESSION_KEY).await.unwrap().unwrap();
            let stored: Session = serde_json::from_str(&stored).unwrap();
            assert_eq!(store.access_token().await, Some(stored.access_token));
        }
    }

    #[tokio::test]
    async fn test_hydrate_restores_session() {
        let (store, db) = store_with(MockIntegrationBackend::new()).await;
        db.put_value(SESSION_KEY, r#"{"accessToken":"jwt-9","firstName":"Bo"}"#)
            .await
            .unwrap();

        let restored = store.hydrate().await.unwrap().unwrap();
        assert_eq!(restored.first_name, "Bo");
        assert_eq!(store.access_token().await.as_deref(), Some("jwt-9"));
    }

    #[tokio::test]
    async fn test_hydrate_discards_corrupt_session() {
        let (store, db) = store_with(MockIntegrationBackend::new()).await;
        db.put_value(SESSION_KEY, "{not json").await.unwrap();

        assert!(store.hydrate().await.unwrap().is_none());
        assert!(store.current().await.is_none());
        assert!(db.get_value(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hydrate_with_empty_storage() {
        let (store, _db) = store_with(MockIntegrationBackend::new()).await;
        assert!(store.hydrate().await.unwrap().is_none());
    }
}
