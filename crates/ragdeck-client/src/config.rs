//! Client configuration

use serde::{Deserialize, Serialize};
use std::env;

use ragdeck_core::{Error, Result, SessionConfig, mask_key};

/// Environment variables consulted for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["RAGDECK_API_KEY", "ZEROENTROPY_API_KEY"];

/// Environment variable overriding the service endpoint
pub const ENDPOINT_VAR: &str = "RAGDECK_BASE_URL";

/// Layered client settings: environment first, explicit values on top
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

impl ClientConfig {
    /// Create configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());

        let endpoint = lookup(ENDPOINT_VAR).filter(|value| !value.trim().is_empty());

        Self { api_key, endpoint }
    }

    /// Replace the API key when a non-blank value is given
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Replace the endpoint when a non-blank value is given
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Validate into an immutable session configuration
    pub fn into_session_config(self) -> Result<SessionConfig> {
        let api_key = self.api_key.ok_or_else(|| {
            Error::Auth(format!(
                "no API key provided; pass --api-key or set {}",
                API_KEY_VARS[0]
            ))
        })?;

        let config = SessionConfig::new(api_key)?;
        match self.endpoint {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => Ok(config),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_key))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
