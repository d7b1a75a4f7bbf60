//! Attestation endpoint client.

use async_trait::async_trait;
use hypernet_types::{CredentialError, FingerprintConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{seal_profile, DeviceProfile, SessionSealer};
use crate::cache::CredentialSource;
use crate::error::AppResult;
use crate::utils::http::create_client;

/// The only response code that carries a device id.
pub const FINGERPRINT_SUCCESS_CODE: i64 = 1100;

const COMPRESS_GZIP: u8 = 2;
const ENCODE_AES_HEX: u8 = 5;

/// Request body of the attestation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintEnvelope {
    #[serde(rename = "appId")]
    pub app_id: String,
    pub compress: u8,
    pub data: String,
    pub encode: u8,
    pub ep: String,
    pub organization: String,
    pub os: String,
}

#[derive(Debug, Deserialize)]
struct FingerprintResponse {
    code: Option<i64>,
    #[serde(default)]
    detail: Option<FingerprintDetail>,
}

#[derive(Debug, Deserialize)]
struct FingerprintDetail {
    #[serde(rename = "deviceId")]
    device_id: Option<String>,
}

/// Posts a freshly sealed profile and extracts the device id.
#[derive(Debug, Clone)]
pub struct FingerprintClient {
    http: Client,
    endpoint: String,
    organization: String,
    app_id: String,
    sealer: SessionSealer,
}

impl FingerprintClient {
    /// Build the client. Fails if the public key cannot be parsed.
    pub fn new(config: &FingerprintConfig) -> AppResult<Self> {
        Ok(Self {
            http: create_client(config.timeout_secs)?,
            endpoint: config.endpoint_url.clone(),
            organization: config.organization.clone(),
            app_id: config.app_id.clone(),
            sealer: SessionSealer::from_base64_key(&config.public_key)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generate a profile, seal it under a new session id and wrap it.
    pub fn build_envelope(&self) -> AppResult<FingerprintEnvelope> {
        let session_id = Uuid::new_v4().to_string();
        let profile = DeviceProfile::generate(&self.organization, &self.app_id);
        let sealed = seal_profile(&profile, &session_id, &self.sealer)?;

        Ok(FingerprintEnvelope {
            app_id: self.app_id.clone(),
            compress: COMPRESS_GZIP,
            data: sealed.data,
            encode: ENCODE_AES_HEX,
            ep: sealed.ep,
            organization: self.organization.clone(),
            os: "web".to_string(),
        })
    }

    /// One attestation round trip.
    pub async fn fetch_device_id(&self) -> Result<String, CredentialError> {
        let envelope = self.build_envelope().map_err(|e| e.into_credential())?;

        let response = self
            .http
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| CredentialError::transport(format!("fingerprint request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::transport(format!("fingerprint body unreadable: {}", e)))?;

        parse_device_id(status, &body)
    }
}

fn parse_device_id(status: reqwest::StatusCode, body: &str) -> Result<String, CredentialError> {
    let parsed: FingerprintResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) if !status.is_success() => {
            return Err(CredentialError::transport(format!(
                "fingerprint endpoint returned {}: {}",
                status, e
            )));
        },
        Err(_) => {
            return Err(CredentialError::FingerprintRejected { code: None, body: body.to_string() });
        },
    };

    if parsed.code != Some(FINGERPRINT_SUCCESS_CODE) {
        tracing::warn!("Fingerprint rejected with code {:?}", parsed.code);
        return Err(CredentialError::FingerprintRejected { code: parsed.code, body: body.to_string() });
    }

    match parsed.detail.and_then(|d| d.device_id) {
        Some(device_id) if !device_id.is_empty() => Ok(format!("B{}", device_id)),
        _ => Err(CredentialError::FingerprintRejected {
            code: Some(FINGERPRINT_SUCCESS_CODE),
            body: body.to_string(),
        }),
    }
}

#[async_trait]
impl CredentialSource<String> for FingerprintClient {
    fn name(&self) -> &'static str {
        "device_id"
    }

    async fn fetch(&self) -> Result<String, CredentialError> {
        self.fetch_device_id().await
    }
}
