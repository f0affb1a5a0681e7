// Zoom event client library
// Session, Zoom connection status and event submission on top of the
// integration backend

pub mod backend;
pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod http_config;
pub mod ledger;
pub mod meeting;
pub mod models;
pub mod session;
pub mod submission;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use backend::{HttpBackend, IntegrationBackend};
pub use config::AppConfig;
pub use connection::ConnectionTracker;
pub use database::Database;
pub use error::{AppError, AppResult};
pub use ledger::EventLedger;
pub use meeting::MeetingClient;
pub use models::*;
pub use session::SessionStore;
pub use submission::{EventSubmitter, SubmissionState};
pub use validation::validate_event;

use log::info;
use std::sync::Arc;

/// Every collaborator, wired once per process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub session: Arc<SessionStore>,
    pub connection: Arc<ConnectionTracker>,
    pub meetings: Arc<MeetingClient>,
    pub events: Arc<EventSubmitter>,
}

impl AppState {
    /// Opens the configured database, talks HTTP to the configured backends
    /// and restores any saved session.
    pub async fn initialize(config: AppConfig) -> AppResult<Self> {
        let db = Database::open(&config.storage_path).await?;
        let backend: Arc<dyn IntegrationBackend> = Arc::new(HttpBackend::new(&config)?);
        Self::with_backend(config, db, backend).await
    }

    pub async fn with_backend(
        config: AppConfig,
        db: Database,
        backend: Arc<dyn IntegrationBackend>,
    ) -> AppResult<Self> {
        let session = Arc::new(SessionStore::new(db.clone(), backend.clone()));
        session.hydrate().await?;

        let connection = Arc::new(ConnectionTracker::new(
            &config,
            session.clone(),
            backend.clone(),
            db.clone(),
        )?);
        let meetings = Arc::new(MeetingClient::new(&config, session.clone(), backend));
        let events = Arc::new(EventSubmitter::new(
            connection.clone(),
            meetings.clone(),
            config.timezone,
        ));

        info!("Application state initialized");

        Ok(Self {
            config: Arc::new(config),
            db,
            session,
            connection,
            meetings,
            events,
        })
    }

    /// Logs out and forgets the cached connection status.
    pub async fn logout(&self) -> AppResult<()> {
        self.session.logout().await?;
        self.connection.reset().await;
        Ok(())
    }
}
