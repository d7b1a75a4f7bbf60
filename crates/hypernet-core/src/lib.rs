//! # HyperNet Core
//!
//! Credential layer of the HyperNet account client.
//!
//! ```text
//! hypernet-core/src/
//! ├── fingerprint/   # device profile → obfuscate → gzip → AES/RSA seal → attestation
//! ├── signing/       # body/query canonicalization, HMAC signer, sign-token client
//! ├── cache/         # TTL credential cache with bounded retry
//! ├── provider.rs    # CredentialProvider: caches + signed requests
//! ├── config.rs      # JSON config + HYPERNET_* environment overrides
//! └── logging.rs     # tracing subscriber, secret redaction
//! ```

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod provider;
pub mod signing;
pub mod utils;

// Re-export commonly used types
pub use error::{AppError, AppResult};
pub use fingerprint::{DeviceIdCache, FingerprintClient};
pub use provider::{CredentialProvider, SignedRequest};
pub use signing::{QueryParams, SignTokenCache, SignTokenClient, SignedHeaders};
