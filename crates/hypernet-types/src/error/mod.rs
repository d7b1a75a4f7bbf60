//! Typed error definitions for HyperNet.
//!
//! Errors are serializable so diagnostics can be forwarded verbatim, and
//! matchable so the retry layer can classify them.

mod config;
mod credential;
mod signing;

pub use config::ConfigError;
pub use credential::CredentialError;
pub use signing::SigningError;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = CredentialError::FingerprintRejected {
            code: Some(1101),
            body: "{\"code\":1101}".to_string(),
        };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"FingerprintRejected\""));
        assert!(json.contains("1101"));

        let deserialized: CredentialError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = SigningError::InvalidQuery { message: "expected object".to_string() };
        assert!(err.to_string().contains("expected object"));
    }
}
