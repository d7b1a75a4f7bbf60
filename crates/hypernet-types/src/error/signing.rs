//! Request canonicalization errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while deriving the signed material of a request.
///
/// These are caller-input errors; the HMAC and digest steps themselves
/// cannot fail.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum SigningError {
    /// Query parameters given as a JSON string did not parse to an object
    #[error("Invalid query parameters: {message}")]
    InvalidQuery {
        /// Description of the parse failure
        message: String,
    },

    /// The sign token was rejected as an HMAC key
    #[error("Invalid signing key: {message}")]
    InvalidKey {
        /// Description of the key failure
        message: String,
    },

    /// A computed header value cannot be carried in an HTTP header
    #[error("Invalid header value for {name}")]
    InvalidHeaderValue {
        /// Header name
        name: String,
    },
}
