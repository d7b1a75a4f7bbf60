//! Per-request signing context.

use serde::{Deserialize, Serialize};

/// Platform tag sent with every signed request.
pub const SIGN_PLATFORM: &str = "3";

/// Signing protocol version sent as `vName`.
pub const SIGN_VERSION: &str = "1.0.0";

/// Context bound into every request signature.
///
/// Field order is part of the signed material: the compact JSON form of this
/// struct is `{"platform":..,"timestamp":..,"dId":..,"vName":..}` and must stay
/// byte-identical across implementations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningContext {
    /// Platform tag, always `"3"`
    pub platform: String,
    /// Unix seconds as a decimal string
    pub timestamp: String,
    /// Device identifier, empty when the request is not device-bound
    #[serde(rename = "dId")]
    pub device_id: String,
    /// Signing protocol version
    #[serde(rename = "vName")]
    pub version: String,
}

impl SigningContext {
    /// Create a context for the given timestamp and optional device id.
    pub fn new(timestamp: impl Into<String>, device_id: Option<&str>) -> Self {
        Self {
            platform: SIGN_PLATFORM.to_string(),
            timestamp: timestamp.into(),
            device_id: device_id.unwrap_or_default().to_string(),
            version: SIGN_VERSION.to_string(),
        }
    }

    /// Header name/value pairs, in declared order.
    pub fn header_pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("platform", self.platform.as_str()),
            ("timestamp", self.timestamp.as_str()),
            ("dId", self.device_id.as_str()),
            ("vName", self.version.as_str()),
        ]
    }
}
