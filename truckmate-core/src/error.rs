//! Error types for truckmate-core

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Main error type for the truckmate-core library
#[derive(Error, Debug)]
pub enum Error {
    /// No response from the backend (connect, DNS, timeout, truncated body)
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Client-side form validation failed; nothing was sent
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Operation needs a session token but none is stored
    #[error("not logged in")]
    NotAuthenticated,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload could not be decoded (e.g. base64 image)
    #[error("decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of a server error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend rejected the credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

/// Result type alias for truckmate-core
pub type Result<T> = std::result::Result<T, Error>;
