//! Errors surfaced by the credential layer (device id and sign token).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that callers of the credential layer can observe.
///
/// Lower-level cipher and encoding failures never surface here; they are
/// either impossible on valid input or reported at construction time.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum CredentialError {
    /// Connection failure, timeout, non-success status or unreadable body
    #[error("Transport failure: {message}")]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// Attestation endpoint answered with a code other than 1100
    #[error("Device fingerprint rejected (code {}): {body}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    FingerprintRejected {
        /// Response code reported by the server, if the body carried one
        code: Option<i64>,
        /// Raw response body for diagnostics
        body: String,
    },

    /// Sign-token retries exhausted and nothing was cached to fall back on
    #[error("Sign token unavailable after {attempts} attempts: {last_error}")]
    SignTokenUnavailable {
        /// Number of fetch attempts made
        attempts: u32,
        /// Display form of the last attempt's error
        last_error: String,
    },
}

impl CredentialError {
    /// Build a transport error from anything displayable.
    pub fn transport(message: impl std::fmt::Display) -> Self {
        Self::Transport { message: message.to_string() }
    }

    /// Check if a retry may succeed.
    ///
    /// The credential cache stops retrying at the first error that is not
    /// transient. Rejections count as transient, so only an already-exhausted
    /// sign-token error is final.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::FingerprintRejected { .. })
    }
}
