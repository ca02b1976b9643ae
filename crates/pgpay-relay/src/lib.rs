//! actix-web server for the PG payments relay.
//!
//! Binds the [`pgpay::Relay`] operations to HTTP routes, loads configuration
//! from the environment, and carries the CORS, rate-limit, logging and
//! Prometheus layers around them.

pub mod config;
pub mod cors;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// Request body limit for JSON and raw payloads.
pub const BODY_LIMIT: usize = 65_536;
