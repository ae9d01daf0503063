// Ardhi API proxy
//
// Thin HTTP layer in front of the Ardhi backend: forwards the user directory
// and agreement updates, and accepts realtime socket connections.

pub mod config;
pub mod error;
pub mod server;

pub use config::*;
