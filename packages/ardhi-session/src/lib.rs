//! Ardhi session hand-off
//!
//! After the login page sends a one-time code, the verification page takes
//! over: it reads the phone number from the query string, loads the user
//! directory (from a one hour cache or the API), collects the six-character
//! code, verifies it, and sends the user to the page for their role.
//!
//! # Example
//!
//! ```rust,ignore
//! use ardhi_session::{ClientConfig, DefaultFlow, NavigationParams};
//!
//! let config = ClientConfig::from_env()?;
//! let mut flow = DefaultFlow::from_config(&config);
//!
//! flow.activate(&NavigationParams::from_query("phone_number=255712345678")).await;
//! for (i, c) in "123456".chars().enumerate() {
//!     flow.input(i, &c.to_string());
//! }
//!
//! match flow.submit().await {
//!     Some(destination) => println!("go to {}", destination.path()),
//!     None => println!("{}", flow.error_message().unwrap_or_default()),
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod machine;
pub mod otp;
pub mod phone;
pub mod routes;
pub mod types;

pub use cache::{CacheStore, DirectoryCache, FileStore, MemoryStore};
pub use client::{ApiClient, DirectoryFetcher};
pub use config::ClientConfig;
pub use error::{CacheError, ClientError, FlowError, VerifyError};
pub use flow::{DefaultFlow, NavigationParams, VerificationFlow};
pub use machine::{
    DirectorySource, VerificationCommand, VerificationEvent, VerificationMachine,
    VerificationState,
};
pub use otp::{OtpBuffer, OtpVerifier, SimulatedVerifier, OTP_LENGTH};
pub use routes::Destination;
pub use types::{DirectorySnapshot, Role, User};
