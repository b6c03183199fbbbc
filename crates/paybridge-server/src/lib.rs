//! HTTP surface for the `paybridge` payment adapters.

pub mod config;
pub mod cors;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod routes;
pub mod security;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;
