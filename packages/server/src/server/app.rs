//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, patch},
    Router,
};
use ardhi_session::ApiClient;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{health_handler, patch_agreement_handler, users_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// `None` when `BASE_URL` is not configured
    pub api: Option<ApiClient>,
}

impl AppState {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            api: base_url.map(ApiClient::new),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.api.as_ref().map(ApiClient::base_url)
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // CORS configuration - allow any origin unless a list is configured
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PATCH])
        .allow_headers([CONTENT_TYPE]);
    let cors = if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    };

    Router::new()
        .route("/api/users", get(users_handler))
        .route("/api/agreements", patch(patch_agreement_handler))
        .route("/api/agreements/", patch(patch_agreement_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(Extension(state)),
        )
}
