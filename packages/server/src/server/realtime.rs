//! Realtime connection acceptor.
//!
//! GET /socket (WebSocket upgrade) on its own port.
//!
//! Accepts socket connections and logs connects and disconnects. Inbound
//! messages are read and discarded; nothing is ever sent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::Response,
    routing::get,
    Router,
};
use uuid::Uuid;

/// Tracks open connections
#[derive(Clone, Default)]
pub struct RealtimeState {
    active: Arc<AtomicUsize>,
}

impl RealtimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Register a connection; the disconnect is logged when the guard drops.
    pub fn connect(&self) -> ConnectionGuard {
        let id = Uuid::new_v4();
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(connection_id = %id, active, "A user connected");
        ConnectionGuard {
            id,
            active: self.active.clone(),
        }
    }
}

pub struct ConnectionGuard {
    id: Uuid,
    active: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let active = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::info!(connection_id = %self.id, active, "A user disconnected");
    }
}

pub fn realtime_router(state: RealtimeState) -> Router {
    Router::new()
        .route("/socket", get(socket_handler))
        .layer(Extension(state))
}

async fn socket_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<RealtimeState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: RealtimeState) {
    let _guard = state.connect();

    while let Some(message) = socket.recv().await {
        match message {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
}

/// Bind `port` and accept connections until the process exits.
pub async fn serve_realtime(port: u16, state: RealtimeState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind realtime acceptor to {}", addr))?;

    tracing::info!("Realtime acceptor running on ws://localhost:{}/socket", port);

    axum::serve(listener, realtime_router(state))
        .await
        .context("Realtime acceptor error")?;

    Ok(())
}
