//! Test harness: a throwaway upstream backend plus the proxy router.
//!
//! The upstream is a real Axum server on an ephemeral port so the proxy's
//! reqwest calls go over the wire; the proxy itself is driven in-process
//! with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::extract::Query;
use axum::http::{Method, Request, StatusCode};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};
use server_core::server::{build_app, AppState};
use tower::ServiceExt;

/// What the fake backend answers on `/api/users`
#[derive(Clone)]
pub enum UsersReply {
    Ok(Value),
    Error { status: StatusCode, body: String },
}

pub struct TestHarness {
    pub base_url: Option<String>,
    app: Router,
}

impl TestHarness {
    /// Proxy with no `BASE_URL` configured
    pub fn unconfigured() -> Self {
        Self {
            base_url: None,
            app: build_app(AppState::new(None), &[]),
        }
    }

    /// Proxy pointed at a fresh fake backend
    pub async fn with_upstream(users: UsersReply) -> Self {
        init_tracing();
        let base_url = spawn_upstream(users).await;
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            app: build_app(AppState::new(Some(base_url.clone())), &[]),
            base_url: Some(base_url),
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn spawn_upstream(users: UsersReply) -> String {
    let users_route = move || {
        let users = users.clone();
        async move {
            match users {
                UsersReply::Ok(value) => (StatusCode::OK, value.to_string()),
                UsersReply::Error { status, body } => (status, body),
            }
        }
    };

    let app = Router::new()
        .route("/api/users", get(users_route))
        .route("/api/agreements/", patch(upstream_agreement));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[derive(serde::Deserialize)]
struct AgreementQuery {
    id: String,
}

async fn upstream_agreement(
    Query(AgreementQuery { id }): Query<AgreementQuery>,
    Json(document): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if id == "locked" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"detail": "Agreement already signed"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"id": id, "status": "draft", "document": document})),
    )
}

/// A base URL nothing is listening on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
