//! Shared data structures for the HyperNet credential layer.

mod config;
mod enums;
mod signing;

pub use config::{
    CredentialConfig, FingerprintConfig, RefreshPolicy, RetryConfig, SignTokenConfig,
    DEFAULT_APP_ID, DEFAULT_FINGERPRINT_URL, DEFAULT_ORGANIZATION, DEFAULT_PUBLIC_KEY,
};
pub use enums::Region;
pub use signing::{SigningContext, SIGN_PLATFORM, SIGN_VERSION};
