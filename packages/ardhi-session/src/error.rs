//! Error types for the session crate
//!
//! `ClientError`, `CacheError` and `VerifyError` describe infrastructure
//! failures. `FlowError` is what the verification page shows; its `Display`
//! is the exact user-facing message.

use thiserror::Error;

/// Errors talking to the users/agreements API
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors reading or writing the directory cache store
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a one-time-code verifier
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Verification service unavailable: {0}")]
    Unavailable(String),
}

/// User-visible failure of a verification attempt.
///
/// Exactly one is shown at a time; a new failure replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Phone number not found. Please log in again.")]
    MissingPhone,

    #[error("Failed to fetch users. Please try again.")]
    FetchFailed,

    #[error("Failed to load users. Please try again.")]
    EmptyDirectory,

    #[error("Invalid OTP or phone number not found. Please try again.")]
    InvalidCode,

    #[error("User not found. Please try logging in again.")]
    UserNotFound,

    #[error("Unable to determine user role. Please try logging in again.")]
    UnknownRole(String),

    #[error("Failed to verify OTP. Please try again.")]
    VerificationFailed,
}

impl FlowError {
    /// Whether the user can fix this by editing the code and resubmitting.
    /// Setup failures need a fresh login instead.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FlowError::MissingPhone | FlowError::FetchFailed)
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
