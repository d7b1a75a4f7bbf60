//! # HyperNet Types
//!
//! Core types, configuration models, and error definitions for HyperNet.
//!
//! - **`error`** - Typed error hierarchy for credentials, signing, and configuration
//! - **`models`** - Configuration, signing context, region enum
//!
//! ## Architecture Role
//!
//! `hypernet-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          hypernet-types (this crate)
//!                  │
//!                  ▼
//!            hypernet-core
//!                  │
//!                  ▼
//!            hypernet-cli
//! ```
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{ConfigError, CredentialError, SigningError};

// Re-export core model types
pub use models::{
    CredentialConfig, FingerprintConfig, RefreshPolicy, Region, RetryConfig, SignTokenConfig,
    SigningContext,
};
