//! Error types for ragdeck

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy surfaced by every session operation.
///
/// Errors are never retried or rewritten on the way up: whatever the
/// service reported is what the caller sees.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or rejected API key
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller input was rejected before or by the service
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Transport failure, timeout, server failure or malformed response
    #[error("Service error: {0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short label used by the terminal front end
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::Conflict(_) => "conflict",
            Error::Validation(_) => "validation",
            Error::Service(_) => "service",
            Error::Configuration(_) => "configuration",
            Error::Corpus(_) => "corpus",
            Error::Io(_) => "io",
        }
    }
}
