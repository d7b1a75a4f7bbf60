//! HTTP client construction.

use reqwest::Client;
use std::time::Duration;

use crate::error::AppResult;

/// Upper bound on connection establishment, independent of the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create an HTTP client with a finite overall request timeout.
pub fn create_client(timeout_secs: u64) -> AppResult<Client> {
    Ok(base_builder(timeout_secs).build()?)
}

fn base_builder(timeout_secs: u64) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(CONNECT_TIMEOUT.min(Duration::from_secs(timeout_secs)))
        .tcp_nodelay(true)
}
