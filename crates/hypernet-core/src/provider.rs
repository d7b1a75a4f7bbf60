//! Credential facade used by API clients.
//!
//! Owns one device id cache and one sign-token cache. Construct it once and
//! share it behind an `Arc`.

use hypernet_types::{CredentialConfig, CredentialError};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;

use crate::cache::CredentialSource;
use crate::error::AppResult;
use crate::fingerprint::{DeviceIdCache, FingerprintClient};
use crate::logging::redact;
use crate::signing::{
    body_or_query, generate_signature, request_path, QueryParams, SignTokenCache, SignTokenClient,
    SignedHeaders,
};
use crate::utils::http::create_client;

/// Timeout of signed API calls made through [`CredentialProvider::send_signed`].
const API_TIMEOUT_SECS: u64 = 30;

/// A request about to be signed.
#[derive(Debug, Clone)]
pub struct SignedRequest<'a> {
    pub method: Method,
    /// Full URL or bare path
    pub url: &'a str,
    pub params: Option<QueryParams>,
    pub body: Option<&'a Value>,
}

impl<'a> SignedRequest<'a> {
    /// `POST` when a body is present, `GET` otherwise.
    pub fn new(url: &'a str, params: Option<QueryParams>, body: Option<&'a Value>) -> Self {
        let method = if body.is_some() { Method::POST } else { Method::GET };
        Self { method, url, params, body }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

/// Device id and sign token provider plus request signer.
#[derive(Debug)]
pub struct CredentialProvider {
    http: Client,
    device_ids: DeviceIdCache,
    sign_tokens: SignTokenCache,
}

impl CredentialProvider {
    /// Build against the real endpoints described by `config`.
    ///
    /// Fails on malformed static key material.
    pub fn new(config: &CredentialConfig) -> AppResult<Self> {
        let fingerprint: Arc<dyn CredentialSource<String>> =
            Arc::new(FingerprintClient::new(&config.fingerprint)?);
        let sign_token: Arc<dyn CredentialSource<String>> =
            Arc::new(SignTokenClient::from_config(config)?);
        Self::with_sources(config, fingerprint, sign_token)
    }

    /// Build with explicit credential sources.
    pub fn with_sources(
        config: &CredentialConfig,
        device_id_source: Arc<dyn CredentialSource<String>>,
        sign_token_source: Arc<dyn CredentialSource<String>>,
    ) -> AppResult<Self> {
        Ok(Self {
            http: create_client(API_TIMEOUT_SECS)?,
            device_ids: DeviceIdCache::from_config(device_id_source, config),
            sign_tokens: SignTokenCache::from_config(sign_token_source, config),
        })
    }

    pub async fn device_id(&self) -> Result<String, CredentialError> {
        self.device_ids.get_cached_device_id().await
    }

    pub async fn sign_token(&self, force: bool) -> Result<String, CredentialError> {
        self.sign_tokens.get_cached_sign_token(force).await
    }

    /// Sign a request with the cached credentials.
    pub async fn sign(&self, request: &SignedRequest<'_>) -> AppResult<SignedHeaders> {
        self.sign_with(request, false).await
    }

    async fn sign_with(&self, request: &SignedRequest<'_>, force_token: bool) -> AppResult<SignedHeaders> {
        let token = self.sign_token(force_token).await?;
        let device_id = self.device_id().await?;
        let payload = body_or_query(&request.method, request.params.clone(), request.body)?;
        let path = request_path(request.url);

        tracing::debug!(
            method = %request.method,
            path = %path,
            token = %redact(&token),
            device_id = %redact(&device_id),
            forced = force_token,
            "Signing request"
        );

        Ok(generate_signature(&token, &path, &payload, Some(&device_id))?)
    }

    /// `sign`, `platform`, `timestamp`, `dId` and `vName` headers.
    pub async fn signed_headers(&self, request: &SignedRequest<'_>) -> AppResult<HeaderMap> {
        Ok(self.sign(request).await?.to_header_map()?)
    }

    /// Sign and send. A 401 answer force-refreshes the sign token and the
    /// request is signed and sent once more.
    pub async fn send_signed(&self, request: &SignedRequest<'_>) -> AppResult<Response> {
        let response = self.dispatch(request, false).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::warn!(url = request.url, "Signed request unauthorized, refreshing sign token");
        self.dispatch(request, true).await
    }

    async fn dispatch(&self, request: &SignedRequest<'_>, force_token: bool) -> AppResult<Response> {
        let signed = self.sign_with(request, force_token).await?;
        let headers = signed.to_header_map()?;

        let builder = if request.method == Method::GET {
            let mut url = url::Url::parse(request.url)?;
            let query = body_or_query(&Method::GET, request.params.clone(), None)?;
            if !query.is_empty() {
                url.set_query(Some(&query));
            }
            self.http.get(url)
        } else {
            let body = body_or_query(&request.method, None, request.body)?;
            let builder = self.http.request(request.method.clone(), request.url);
            if request.body.is_some() {
                builder.header(CONTENT_TYPE, "application/json").body(body)
            } else {
                builder
            }
        };

        Ok(builder.headers(headers).send().await?)
    }
}
