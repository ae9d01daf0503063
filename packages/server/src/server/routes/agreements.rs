//! PATCH /api/agreements?id=...
//!
//! Forwards the JSON document through `ApiClient::patch_agreement` and
//! returns the updated agreement. Upstream rejections keep their status.

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProxyError;
use crate::server::app::AppState;

#[derive(Deserialize)]
pub struct AgreementQuery {
    id: Option<String>,
}

pub async fn patch_agreement_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<AgreementQuery>,
    Json(document): Json<Value>,
) -> Result<Json<Value>, ProxyError> {
    let Some(api) = state.api.as_ref() else {
        tracing::error!("BASE_URL is not defined in the environment variables.");
        return Err(ProxyError::Configuration);
    };

    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ProxyError::BadRequest("Agreement id is required".to_string()))?;

    let updated = api.patch_agreement(&id, &document).await.map_err(|e| {
        tracing::error!(agreement_id = %id, error = %e, "Error patching agreement");
        ProxyError::from(e)
    })?;

    tracing::info!(agreement_id = %id, "Agreement updated");
    Ok(Json(updated))
}
