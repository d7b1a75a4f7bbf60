//! Per-request HMAC signature.
//!
//! `sign = md5_hex(hmac_sha256_hex(token, path + body_or_query + timestamp + context_json))`
//! where `context_json` is the compact [`SigningContext`] and the timestamp is
//! one second behind the local clock.

use hmac::{Hmac, Mac};
use hypernet_types::{SigningContext, SigningError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sha2::Sha256;

use crate::utils::text::md5_hex;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the final signature.
pub const SIGN_HEADER: &str = "sign";

/// Signature plus the context that was signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub sign: String,
    pub context: SigningContext,
}

impl SignedHeaders {
    /// `sign` followed by the four context headers.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![(SIGN_HEADER, self.sign.as_str())];
        pairs.extend(self.context.header_pairs());
        pairs
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, SigningError> {
        let mut headers = HeaderMap::with_capacity(5);
        for (name, value) in self.pairs() {
            let value = HeaderValue::from_str(value)
                .map_err(|_| SigningError::InvalidHeaderValue { name: name.to_string() })?;
            headers.insert(HeaderName::from_static(header_key(name)), value);
        }
        Ok(headers)
    }
}

// HeaderName::from_static requires lowercase names.
fn header_key(name: &'static str) -> &'static str {
    match name {
        "dId" => "did",
        "vName" => "vname",
        other => other,
    }
}

/// Unix seconds minus one, as the server expects.
pub fn signing_timestamp() -> String {
    (chrono::Utc::now().timestamp() - 1).to_string()
}

/// Sign with an explicit timestamp.
pub fn sign_at(
    token: &str,
    path: &str,
    body_or_query: &str,
    timestamp: &str,
    device_id: Option<&str>,
) -> Result<SignedHeaders, SigningError> {
    let context = SigningContext::new(timestamp, device_id);
    let context_json = serde_json::to_string(&context)
        .map_err(|e| SigningError::InvalidQuery { message: e.to_string() })?;

    let mut mac = <HmacSha256 as Mac>::new_from_slice(token.as_bytes())
        .map_err(|e| SigningError::InvalidKey { message: e.to_string() })?;
    mac.update(path.as_bytes());
    mac.update(body_or_query.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(context_json.as_bytes());
    let hmac_hex = hex::encode(mac.finalize().into_bytes());

    Ok(SignedHeaders { sign: md5_hex(hmac_hex), context })
}

/// Sign at the current time.
pub fn generate_signature(
    token: &str,
    path: &str,
    body_or_query: &str,
    device_id: Option<&str>,
) -> Result<SignedHeaders, SigningError> {
    sign_at(token, path, body_or_query, &signing_timestamp(), device_id)
}
