#![allow(dead_code)]
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use zoom_events::{
    AppConfig, AppError, AppResult, AppState, ConnectionStatus, CreateMeetingRequest, Database, IntegrationBackend,
    LoginRequest, Session,
};

/// In-process stand-in for the auth and Zoom integration backends.
#[derive(Default)]
pub struct FakeBackend {
    pub linked: Mutex<bool>,
    pub meeting_reply: Mutex<Option<AppResult<Value>>>,
    pub login_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub meeting_calls: AtomicUsize,
    pub meeting_requests: Mutex<Vec<CreateMeetingRequest>>,
    /// When set, meeting creation waits for a notification before answering
    pub meeting_gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn linked() -> Self {
        let backend = Self::default();
        *backend.linked.lock().unwrap() = true;
        backend
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.meeting_gate = Some(gate);
        self
    }

    pub fn reply_with(&self, reply: AppResult<Value>) {
        *self.meeting_reply.lock().unwrap() = Some(reply);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn meeting_calls(&self) -> usize {
        self.meeting_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntegrationBackend for FakeBackend {
    async fn login(&self, request: &LoginRequest) -> AppResult<Session> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if request.password == "secret" {
            let mut session = Session::new(format!("jwt-{}", request.email), "Ana");
            session.profile_image_url = Some("https://cdn.example.com/ana.png".to_string());
            Ok(session)
        } else {
            Err(AppError::auth("Invalid email or password"))
        }
    }

    async fn connection_status(&self, _credential: &str) -> AppResult<Option<ConnectionStatus>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if *self.linked.lock().unwrap() {
            Ok(Some(ConnectionStatus {
                is_connected: true,
                user_id: "zu-1".to_string(),
                account_id: "za-1".to_string(),
                account_type: "pro".to_string(),
                user_email: Some("ana@example.com".to_string()),
                user_name: Some("Ana Souza".to_string()),
            }))
        } else {
            Ok(None)
        }
    }

    async fn create_meeting(&self, _credential: &str, request: &CreateMeetingRequest) -> AppResult<Value> {
        self.meeting_calls.fetch_add(1, Ordering::SeqCst);
        self.meeting_requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.meeting_gate {
            gate.notified().await;
        }

        match self.meeting_reply.lock().unwrap().take() {
            Some(reply) => reply,
            None => Ok(json!({"message": "Meeting 81234567890 created successfully"})),
        }
    }
}

pub async fn app_with(backend: Arc<FakeBackend>) -> AppState {
    let db = Database::in_memory().await.unwrap();
    app_with_db(backend, db).await
}

pub async fn app_with_db(backend: Arc<FakeBackend>, db: Database) -> AppState {
    AppState::with_backend(AppConfig::default(), db, backend).await.unwrap()
}

pub fn tomorrow() -> String {
    (chrono::Utc::now() + chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}
