//! Credential caching with bounded retry.

mod credential;
pub mod retry;
mod source;

pub use credential::{CachedCredential, CredentialCache, RefreshFailure};
pub use retry::{retry_fixed, RetryOutcome, RetryPolicy, RetryState};
pub use source::CredentialSource;
