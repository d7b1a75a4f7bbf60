//! Canonical body-or-query string of a request.
//!
//! `GET` requests sign their form-encoded query (`+` for spaces, unreserved
//! characters `A-Z a-z 0-9 _ . - ~` kept). Every other method signs the
//! compact JSON body.

use hypernet_types::SigningError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde_json::{Map, Value};

use crate::utils::text::py_str;

const QUERY_COMPONENT: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-').remove(b'~');

/// Query parameters as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParams {
    /// Already-decoded key/value pairs, in send order
    Map(Map<String, Value>),
    /// A JSON object serialized to a string
    Json(String),
}

impl QueryParams {
    /// Decode into ordered pairs. JSON strings must hold an object.
    pub fn into_map(self) -> Result<Map<String, Value>, SigningError> {
        match self {
            Self::Map(map) => Ok(map),
            Self::Json(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(SigningError::InvalidQuery {
                    message: format!("expected a JSON object, got {}", json_kind(&other)),
                }),
                Err(e) => Err(SigningError::InvalidQuery { message: e.to_string() }),
            },
        }
    }
}

impl From<Map<String, Value>> for QueryParams {
    fn from(map: Map<String, Value>) -> Self {
        Self::Map(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn quote_plus(text: &str) -> String {
    utf8_percent_encode(text, QUERY_COMPONENT).to_string().replace("%20", "+")
}

/// Form-encode pairs in their given order.
pub fn encode_query(params: &Map<String, Value>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", quote_plus(key), quote_plus(&py_str(value))))
        .collect::<Vec<_>>()
        .join("&")
}

/// Signed material for the request payload.
///
/// Missing or empty params and a missing body both produce the empty string.
pub fn body_or_query(
    method: &Method,
    params: Option<QueryParams>,
    body: Option<&Value>,
) -> Result<String, SigningError> {
    if *method == Method::GET {
        return match params {
            Some(params) => Ok(encode_query(&params.into_map()?)),
            None => Ok(String::new()),
        };
    }

    match body {
        Some(body) => serde_json::to_string(body)
            .map_err(|e| SigningError::InvalidQuery { message: e.to_string() }),
        None => Ok(String::new()),
    }
}

/// Path component of a full URL, or the input itself when it is already a path.
pub fn request_path(url_or_path: &str) -> String {
    match url::Url::parse(url_or_path) {
        Ok(url) => url.path().to_string(),
        Err(_) => url_or_path.split(['?', '#']).next().unwrap_or_default().to_string(),
    }
}
