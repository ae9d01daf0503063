use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::{ClientError, Result};

const DEFAULT_OTP_DELAY_MS: u64 = 1000;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// When set, the directory cache is persisted here instead of in memory
    pub cache_dir: Option<PathBuf>,
    pub otp_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cache_dir: None,
            otp_delay: Duration::from_millis(DEFAULT_OTP_DELAY_MS),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let base_url = env::var("BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Configuration("BASE_URL must be set".to_string()))?;

        let otp_delay_ms = match env::var("OTP_DELAY_MS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ClientError::Configuration("OTP_DELAY_MS must be a valid number".to_string())
            })?,
            Err(_) => DEFAULT_OTP_DELAY_MS,
        };

        Ok(Self {
            base_url,
            cache_dir: env::var("DIRECTORY_CACHE_DIR").ok().map(PathBuf::from),
            otp_delay: Duration::from_millis(otp_delay_ms),
        })
    }
}
