//! HTTP backend for ragdeck
//!
//! This crate provides the REST implementation of the `RagService` trait and
//! the environment-driven configuration used to build it.

mod client;
mod config;
mod wire;


pub use client::RagApiClient;
pub use config::{API_KEY_VARS, ClientConfig, ENDPOINT_VAR};

// Re-export core types for convenience
pub use ragdeck_core::{Error, RagService, Result, Session, SessionConfig};

/// Open a session against the hosted service with the given API key.
///
/// An empty key fails here with `Error::Auth`; a key the service refuses
/// fails with `Error::Auth` on first use (see [`Session::verify`]).
pub fn configure(api_key: impl Into<String>) -> Result<Session<RagApiClient>> {
    configure_with(SessionConfig::new(api_key)?)
}

/// Open a session from a prepared configuration
pub fn configure_with(config: SessionConfig) -> Result<Session<RagApiClient>> {
    let client = RagApiClient::new(&config)?;
    Ok(Session::new(config, client))
}
