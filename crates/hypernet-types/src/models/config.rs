//! Credential layer configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::Region;

/// Attestation endpoint (device fingerprint).
pub const DEFAULT_FINGERPRINT_URL: &str = "https://fp-it.portal101.cn/deviceprofile/v4";

/// Organization id registered with the attestation service.
pub const DEFAULT_ORGANIZATION: &str = "UWXspnCCJN4sfYlNfqps";

/// App id registered with the attestation service.
pub const DEFAULT_APP_ID: &str = "default";

/// RSA public key of the attestation service (base64 SubjectPublicKeyInfo).
pub const DEFAULT_PUBLIC_KEY: &str = "MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQCmxMNr7n8ZeT0tE1R9j/mPixoinPkeM+k4VGIn/s0k7N5rJAfnZ0eMER+QhwFvshzo0LNmeUkpR8uIlU/GEVr8mN28sKmwd2gpygqj0ePnBmOW4v0ZVwbSYK+izkhVFk2V/doLoMbWy6b+UnA8mkjvg0iYWRByfRsK2gdl7llqCwIDAQAB";

/// How concurrent cache misses are resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// First caller fetches; concurrent callers wait and reuse its result
    #[default]
    SingleFlight,
    /// Every caller that observes a miss fetches on its own; last write wins
    Concurrent,
}

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    #[validate(range(min = 1_u32, max = 10_u32))]
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    #[validate(range(max = 60_000_u64))]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, delay_ms: 1_000 }
    }
}

/// Attestation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Full URL of the device profile endpoint
    #[validate(url)]
    pub endpoint_url: String,
    /// Organization id sent in the profile and the request envelope
    #[validate(length(min = 1))]
    pub organization: String,
    /// App id sent in the profile and the request envelope
    #[validate(length(min = 1))]
    pub app_id: String,
    /// Base64 RSA public key used to seal the session id
    #[validate(length(min = 1))]
    pub public_key: String,
    /// Request timeout in seconds
    #[validate(range(min = 1_u64, max = 300_u64))]
    pub timeout_secs: u64,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_FINGERPRINT_URL.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            app_id: DEFAULT_APP_ID.to_string(),
            public_key: DEFAULT_PUBLIC_KEY.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Sign-token endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(default)]
pub struct SignTokenConfig {
    /// Explicit refresh URL; derived from the region when absent
    #[validate(url)]
    pub endpoint_url: Option<String>,
    /// Request timeout in seconds
    #[validate(range(min = 1_u64, max = 300_u64))]
    pub timeout_secs: u64,
}

impl Default for SignTokenConfig {
    fn default() -> Self {
        Self { endpoint_url: None, timeout_secs: 10 }
    }
}

/// Top-level configuration of the credential layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(default)]
pub struct CredentialConfig {
    /// Service region; selects the default sign-token host
    pub region: Region,
    /// Attestation endpoint settings
    #[validate(nested)]
    pub fingerprint: FingerprintConfig,
    /// Sign-token endpoint settings
    #[validate(nested)]
    pub sign_token: SignTokenConfig,
    /// Device id validity window in seconds
    #[validate(range(min = 1_u64))]
    pub device_id_ttl_secs: u64,
    /// Sign token validity window in seconds
    #[validate(range(min = 1_u64))]
    pub sign_token_ttl_secs: u64,
    /// Retry policy shared by both caches
    #[validate(nested)]
    pub retry: RetryConfig,
    /// Resolution of concurrent cache misses
    pub refresh_policy: RefreshPolicy,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            region: Region::default(),
            fingerprint: FingerprintConfig::default(),
            sign_token: SignTokenConfig::default(),
            device_id_ttl_secs: 3_600,
            sign_token_ttl_secs: 300,
            retry: RetryConfig::default(),
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

impl CredentialConfig {
    /// Effective sign-token URL (explicit override or region default).
    pub fn sign_token_url(&self) -> String {
        self.sign_token.endpoint_url.clone().unwrap_or_else(|| self.region.sign_token_url())
    }
}
