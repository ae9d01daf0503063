use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub realtime_port: u16,
    /// Upstream backend. Missing is not fatal at startup: each proxied
    /// request answers with a configuration error instead.
    pub base_url: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            realtime_port: env::var("REALTIME_PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .context("REALTIME_PORT must be a valid number")?,
            base_url: env::var("BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
