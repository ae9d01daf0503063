use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    upstream_configured: bool,
}

/// Health check endpoint
///
/// Always 200 while the process is serving; `upstream_configured` reports
/// whether proxied routes can reach a backend at all.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            upstream_configured: state.base_url().is_some(),
        }),
    )
}
