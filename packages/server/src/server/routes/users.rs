//! GET /api/users
//!
//! Forwards to `{BASE_URL}/api/users` and returns the records untouched. A
//! non-2xx upstream answer is relayed with its status and the body's
//! `detail` as the error message.

use axum::{extract::Extension, Json};
use serde_json::Value;

use crate::error::ProxyError;
use crate::server::app::AppState;

pub async fn users_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Value>>, ProxyError> {
    let Some(api) = state.api.as_ref() else {
        tracing::error!("BASE_URL is not defined in the environment variables.");
        return Err(ProxyError::Configuration);
    };

    let users = api.fetch_users_raw().await.map_err(|e| {
        tracing::error!(error = %e, "Error fetching users");
        ProxyError::from(e)
    })?;

    tracing::debug!(count = users.len(), "Fetched users");
    Ok(Json(users))
}
