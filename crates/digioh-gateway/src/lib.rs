//! # digiOH Gateway
//!
//! HTTP gateway for the digiOH marketing site and its admin area. Public
//! routes read published content; `/admin` routes run behind the route guard
//! and read with the caller's own token.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Request extractors for session and admin access.
pub mod access;
mod error;
/// Route handlers.
pub mod handlers;
mod server;
/// Session cookie helpers.
pub mod session;

pub use access::{AdminAccess, AdminLayout, Visitor};
pub use error::ApiError;
pub use server::{Gateway, GatewayBuilder, GatewayConfig, GatewayState, build_router};

use std::sync::Arc;

use digioh_backend::{BackendClient, BackendError};
use digioh_core::config::{Config, ConfigError};

/// Start the gateway against the configured backend.
///
/// # Errors
///
/// Returns error if the backend is not configured or the server fails.
pub async fn start(config: &Config) -> Result<(), GatewayError> {
    let credentials = config.backend()?;
    let client = Arc::new(BackendClient::new(&credentials)?);
    tracing::info!(backend = %client.base_url(), "Using backend");

    let gateway = GatewayBuilder::new()
        .with_config(GatewayConfig::from(config))
        .with_backend(client)
        .build()?;
    gateway.run().await
}

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Server error.
    #[error("Server error: {0}")]
    Server(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Missing or invalid settings.
    #[error(transparent)]
    Settings(#[from] ConfigError),

    /// Backend client error.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
