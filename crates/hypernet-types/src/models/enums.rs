//! Service region.

use serde::{Deserialize, Serialize};

/// Region where an account is served.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// Overseas service (skport)
    #[default]
    #[serde(rename = "os")]
    Overseas,
    /// Mainland China service (skland)
    #[serde(rename = "cn")]
    Chinese,
}

impl Region {
    /// Base URL of the account API for this region.
    pub const fn base_api_url(self) -> &'static str {
        match self {
            Self::Overseas => "https://zonai.skport.com/api/v1",
            Self::Chinese => "https://zonai.skland.com/api/v1",
        }
    }

    /// Sign-token refresh endpoint for this region.
    pub fn sign_token_url(self) -> String {
        format!("{}/auth/refresh", self.base_api_url())
    }

    /// Short wire code (`os` / `cn`).
    pub const fn code(self) -> &'static str {
        match self {
            Self::Overseas => "os",
            Self::Chinese => "cn",
        }
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "os" | "overseas" => Ok(Self::Overseas),
            "cn" | "chinese" => Ok(Self::Chinese),
            other => Err(format!("unknown region: {other}")),
        }
    }
}
