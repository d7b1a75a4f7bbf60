use async_trait::async_trait;
use hypernet_types::{CredentialConfig, CredentialError};
use reqwest::Client;
use serde::Deserialize;

use crate::cache::CredentialSource;
use crate::error::AppResult;
use crate::utils::http::create_client;

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    data: Option<RefreshData>,
}

#[derive(Debug, Deserialize)]
struct RefreshData {
    token: Option<String>,
}

/// Unauthenticated `GET /auth/refresh` client.
#[derive(Debug, Clone)]
pub struct SignTokenClient {
    http: Client,
    endpoint: String,
}

impl SignTokenClient {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> AppResult<Self> {
        Ok(Self { http: create_client(timeout_secs)?, endpoint: endpoint.into() })
    }

    pub fn from_config(config: &CredentialConfig) -> AppResult<Self> {
        Self::new(config.sign_token_url(), config.sign_token.timeout_secs)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One refresh round trip. Any failure, including a missing token, is a
    /// transport failure.
    pub async fn fetch_sign_token(&self) -> Result<String, CredentialError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| CredentialError::transport(format!("sign token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::transport(format!(
                "sign token endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::transport(format!("sign token response malformed: {}", e)))?;

        match parsed.data.and_then(|d| d.token) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(CredentialError::transport("sign token response carried no data.token")),
        }
    }
}

#[async_trait]
impl CredentialSource<String> for SignTokenClient {
    fn name(&self) -> &'static str {
        "sign_token"
    }

    async fn fetch(&self) -> Result<String, CredentialError> {
        self.fetch_sign_token().await
    }
}
