//! Shared test helpers: a throwaway upstream API and counting collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ardhi_session::{ClientError, DirectoryFetcher, OtpVerifier, Role, User, VerifyError};
use async_trait::async_trait;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};

pub fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn user(name: &str, phone_number: &str, role: &str) -> User {
    User {
        name: name.to_string(),
        phone_number: phone_number.to_string(),
        role: Role::from(role.to_string()),
    }
}

pub fn amina() -> User {
    user("Amina", "255712345678", "buyer")
}

// ============================================================================
// Upstream API
// ============================================================================

pub struct MockApi {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockApi {
    /// Number of requests served on `/api/users`
    pub fn user_hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serve `GET /api/users` with a fixed status and raw body, plus an echoing
/// `PATCH /api/agreements/`.
pub async fn spawn_api(status: StatusCode, body: &str) -> MockApi {
    let hits = Arc::new(AtomicUsize::new(0));
    let body = body.to_string();

    let users = {
        let hits = hits.clone();
        move || {
            let hits = hits.clone();
            let body = body.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (status, [("content-type", "application/json")], body)
            }
        }
    };

    let app = Router::new()
        .route("/api/users", get(users))
        .route("/api/agreements/", patch(echo_agreement));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        base_url: format!("http://{}", addr),
        hits,
    }
}

pub async fn spawn_users_api(users: &[User]) -> MockApi {
    spawn_api(StatusCode::OK, &serde_json::to_string(users).unwrap()).await
}

#[derive(serde::Deserialize)]
struct AgreementQuery {
    id: Option<String>,
}

async fn echo_agreement(
    Query(query): Query<AgreementQuery>,
    Json(document): Json<Value>,
) -> (StatusCode, Json<Value>) {
    match query.id.as_deref() {
        Some("missing") => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found"}))),
        Some("archived") => (StatusCode::GONE, Json(json!({}))),
        Some(id) => (StatusCode::OK, Json(json!({"id": id, "document": document}))),
        None => (StatusCode::BAD_REQUEST, Json(json!({"detail": "id required"}))),
    }
}

/// A base URL nothing is listening on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ============================================================================
// Counting collaborators
// ============================================================================

#[derive(Clone)]
pub struct StaticFetcher {
    users: Option<Vec<User>>,
    calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn returning(users: Vec<User>) -> Self {
        Self {
            users: Some(users),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            users: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryFetcher for StaticFetcher {
    async fn fetch_all(&self) -> Result<Vec<User>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.users.clone().ok_or_else(|| ClientError::Api {
            status: 502,
            message: "Network response was not ok".to_string(),
        })
    }
}

#[derive(Clone)]
pub struct CountingVerifier {
    outcome: Result<bool, String>,
    calls: Arc<AtomicUsize>,
}

impl CountingVerifier {
    pub fn approving() -> Self {
        Self::with_outcome(Ok(true))
    }

    pub fn rejecting() -> Self {
        Self::with_outcome(Ok(false))
    }

    pub fn erroring() -> Self {
        Self::with_outcome(Err("verification backend down".to_string()))
    }

    fn with_outcome(outcome: Result<bool, String>) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OtpVerifier for CountingVerifier {
    async fn verify(&self, _phone_number: &str, _code: &str) -> Result<bool, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(VerifyError::Unavailable)
    }
}
