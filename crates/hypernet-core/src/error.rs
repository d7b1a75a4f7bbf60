//! Unified error types for HyperNet Core.

use hypernet_types::{CredentialError, SigningError};
use serde::Serialize;
use thiserror::Error;

/// Main error type for all HyperNet Core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Device id or sign token could not be obtained.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Request could not be canonicalized for signing.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Network request failed (HTTP client).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Static key material could not be loaded, or a sealing step failed.
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl From<rsa::Error> for AppError {
    fn from(e: rsa::Error) -> Self {
        AppError::Crypto(e.to_string())
    }
}

impl AppError {
    /// Collapse into the caller-facing credential taxonomy.
    ///
    /// Anything that is not already a credential error counts as a failed
    /// attempt of the transport round trip.
    pub fn into_credential(self) -> CredentialError {
        match self {
            AppError::Credential(e) => e,
            other => CredentialError::transport(other),
        }
    }
}

/// Result type alias for HyperNet Core operations.
pub type AppResult<T> = Result<T, AppError>;
