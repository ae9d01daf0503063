// HTTP server setup (Axum proxy + realtime acceptor)
pub mod app;
pub mod realtime;
pub mod routes;

pub use app::*;
