use ardhi_session::ClientError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by the proxy routes. Rendered as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Server configuration error")]
    Configuration,

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    BadRequest(String),
}

impl From<ClientError> for ProxyError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Configuration(_) => ProxyError::Configuration,
            ClientError::Api { status, message } => ProxyError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            ClientError::Network(e) => ProxyError::Network(e.to_string()),
            ClientError::Parse(e) => ProxyError::Network(e.to_string()),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::Configuration | ProxyError::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
