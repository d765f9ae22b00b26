//! Session configuration

use url::Url;

use crate::{Error, Result};

/// Default REST endpoint of the hosted service
pub const DEFAULT_ENDPOINT: &str = "https://api.zeroentropy.dev/v1";

/// Immutable per-session settings: the API key and an optional endpoint override.
///
/// Fields are private so a config can only be obtained through [`SessionConfig::new`],
/// which rejects empty keys and unusable endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    api_key: String,
    base_endpoint: Option<String>,
}

impl SessionConfig {
    /// Create a configuration for the default endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Auth("API key is empty".to_string()));
        }

        Ok(Self {
            api_key,
            base_endpoint: None,
        })
    }

    /// Override the service endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let parsed = Url::parse(&endpoint)
            .map_err(|e| Error::Configuration(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "Endpoint must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        self.base_endpoint = Some(endpoint.trim_end_matches('/').to_string());
        Ok(self)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Endpoint in effect, without a trailing slash
    pub fn endpoint(&self) -> &str {
        self.base_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Key shown as its first and last four characters, safe for logs and screens
    pub fn masked_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_key", &self.masked_key())
            .field("endpoint", &self.endpoint())
            .finish()
    }
}

/// Mask an API key for display
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
