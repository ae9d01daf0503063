//! HTTP client for the Ardhi API (user directory and agreements)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::User;

pub const GENERIC_NETWORK_MESSAGE: &str = "Network response was not ok";

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Source of the full user directory.
///
/// No retries: a failure is handed back to the caller as-is.
#[async_trait]
pub trait DirectoryFetcher: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<User>>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `/api/users`, records exactly as the backend sent them
    pub async fn fetch_users_raw(&self) -> Result<Vec<Value>> {
        let url = format!("{}/api/users", self.base_url);
        debug!(%url, "Fetching user directory");

        let response = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = detail_message(response, GENERIC_NETWORK_MESSAGE).await;
            error!(status = status.as_u16(), %message, "Error fetching users");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET `/api/users` as typed users.
    ///
    /// Records that don't fit `User` (missing number, null name, ...) are
    /// skipped individually; the rest of the directory stays usable.
    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        let records = self.fetch_users_raw().await?;
        let total = records.len();

        let users: Vec<User> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unusable user record");
                    None
                }
            })
            .collect();

        debug!(count = users.len(), skipped = total - users.len(), "Fetched user directory");
        Ok(users)
    }

    /// PATCH `/api/agreements/?id={id}` with a JSON document; returns the
    /// updated agreement. A rejection carries the backend's `detail` when
    /// it sends one.
    pub async fn patch_agreement(&self, id: &str, document: &Value) -> Result<Value> {
        let url = format!("{}/api/agreements/", self.base_url);
        debug!(%url, agreement_id = %id, "Patching agreement");

        let response = self
            .client
            .patch(&url)
            .query(&[("id", id)])
            .json(document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let fallback = format!("Failed to patch agreement. Status: {}", status.as_u16());
            let message = detail_message(response, &fallback).await;
            error!(agreement_id = %id, status = status.as_u16(), %message, "Error patching agreement");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl DirectoryFetcher for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<User>> {
        self.fetch_users().await
    }
}

/// `detail` field of a backend error body, if it has one.
fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| b.detail)
}

/// The body's `detail` field, or `fallback` when absent.
async fn detail_message(response: reqwest::Response, fallback: &str) -> String {
    let body = response.text().await.unwrap_or_default();
    error_detail(&body).unwrap_or_else(|| fallback.to_string())
}
