//! Hour-long cache of the attested device id.

use hypernet_types::{CredentialConfig, CredentialError, RefreshPolicy};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CredentialCache, CredentialSource, RetryPolicy};

/// Default lifetime of an attested device id.
pub const DEVICE_ID_TTL: Duration = Duration::from_secs(3600);

/// Device id slot backed by an attestation source.
pub struct DeviceIdCache {
    cache: CredentialCache<String>,
    source: Arc<dyn CredentialSource<String>>,
}

impl DeviceIdCache {
    pub fn new(
        source: Arc<dyn CredentialSource<String>>,
        ttl: Duration,
        retry: RetryPolicy,
        policy: RefreshPolicy,
    ) -> Self {
        Self { cache: CredentialCache::new("device_id", ttl, retry, policy), source }
    }

    pub fn from_config(source: Arc<dyn CredentialSource<String>>, config: &CredentialConfig) -> Self {
        Self::new(
            source,
            Duration::from_secs(config.device_id_ttl_secs),
            RetryPolicy::from(&config.retry),
            config.refresh_policy,
        )
    }

    /// Cached device id, attesting a new one when missing or expired.
    ///
    /// After the last failed attempt its error is returned as-is; an expired
    /// id is never handed out.
    pub async fn get_cached_device_id(&self) -> Result<String, CredentialError> {
        self.cache.get_or_refresh(self.source.as_ref(), false).await.map_err(|failure| {
            tracing::error!(
                "Device id unavailable after {} attempts: {}",
                failure.attempts,
                failure.last_error
            );
            failure.last_error
        })
    }

    /// Fresh device id without fetching.
    pub async fn peek(&self) -> Option<String> {
        self.cache.peek().await
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }
}

impl std::fmt::Debug for DeviceIdCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceIdCache")
            .field("source", &self.source.name())
            .field("ttl", &self.cache.ttl())
            .finish()
    }
}
