//! Five-minute cache of the HMAC sign token.

use hypernet_types::{CredentialConfig, CredentialError, RefreshPolicy};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CredentialCache, CredentialSource, RefreshFailure, RetryPolicy};

/// Default lifetime of a sign token.
pub const SIGN_TOKEN_TTL: Duration = Duration::from_secs(300);

/// Sign token slot with stale fallback.
pub struct SignTokenCache {
    cache: CredentialCache<String>,
    source: Arc<dyn CredentialSource<String>>,
}

impl SignTokenCache {
    pub fn new(
        source: Arc<dyn CredentialSource<String>>,
        ttl: Duration,
        retry: RetryPolicy,
        policy: RefreshPolicy,
    ) -> Self {
        Self { cache: CredentialCache::new("sign_token", ttl, retry, policy), source }
    }

    pub fn from_config(source: Arc<dyn CredentialSource<String>>, config: &CredentialConfig) -> Self {
        Self::new(
            source,
            Duration::from_secs(config.sign_token_ttl_secs),
            RetryPolicy::from(&config.retry),
            config.refresh_policy,
        )
    }

    /// Cached sign token; `force` always refetches.
    ///
    /// When every attempt fails the last token seen is returned even if it
    /// has expired. Only with nothing cached does this fail.
    pub async fn get_cached_sign_token(&self, force: bool) -> Result<String, CredentialError> {
        match self.cache.get_or_refresh(self.source.as_ref(), force).await {
            Ok(token) => Ok(token),
            Err(RefreshFailure { stale: Some(token), last_error, attempts }) => {
                tracing::warn!(
                    "Sign token refresh failed after {} attempts ({}), reusing stale token",
                    attempts,
                    last_error
                );
                Ok(token)
            },
            Err(RefreshFailure { stale: None, last_error, attempts }) => {
                Err(CredentialError::SignTokenUnavailable { attempts, last_error: last_error.to_string() })
            },
        }
    }

    pub async fn peek(&self) -> Option<String> {
        self.cache.peek().await
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }
}

impl std::fmt::Debug for SignTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignTokenCache")
            .field("source", &self.source.name())
            .field("ttl", &self.cache.ttl())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::time::advance;

    /// Issues `token-<n>` until switched off.
    struct Switchable {
        calls: AtomicU32,
        online: AtomicBool,
    }

    impl Switchable {
        fn new() -> Arc<Self> {
            Arc::new(Self { calls: AtomicU32::new(0), online: AtomicBool::new(true) })
        }
    }

    #[async_trait]
    impl CredentialSource<String> for Switchable {
        fn name(&self) -> &'static str {
            "switchable"
        }

        async fn fetch(&self) -> Result<String, CredentialError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.online.load(Ordering::SeqCst) {
                Ok(format!("token-{}", n))
            } else {
                Err(CredentialError::transport("connection refused"))
            }
        }
    }

    fn cache_for(source: Arc<Switchable>) -> SignTokenCache {
        SignTokenCache::new(
            source,
            SIGN_TOKEN_TTL,
            RetryPolicy::new(3, Duration::from_secs(1)),
            RefreshPolicy::SingleFlight,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refetches_before_expiry() {
        let source = Switchable::new();
        let cache = cache_for(source.clone());

        assert_eq!(cache.get_cached_sign_token(false).await, Ok("token-1".to_string()));
        advance(SIGN_TOKEN_TTL - Duration::from_secs(1)).await;
        assert_eq!(cache.get_cached_sign_token(false).await, Ok("token-1".to_string()));
        assert_eq!(cache.get_cached_sign_token(true).await, Ok("token-2".to_string()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fallback_after_exhaustion() {
        let source = Switchable::new();
        let cache = cache_for(source.clone());

        cache.get_cached_sign_token(false).await.ok();
        advance(SIGN_TOKEN_TTL).await;
        source.online.store(false, Ordering::SeqCst);

        assert_eq!(cache.get_cached_sign_token(false).await, Ok("token-1".to_string()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);

        // forced refresh falls back the same way
        assert_eq!(cache.get_cached_sign_token(true).await, Ok("token-1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_without_cached_token() {
        let source = Switchable::new();
        source.online.store(false, Ordering::SeqCst);
        let cache = cache_for(source);

        match cache.get_cached_sign_token(false).await {
            Err(CredentialError::SignTokenUnavailable { attempts, last_error }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("connection refused"));
            },
            other => panic!("unexpected: {other:?}"),
        }
    }
}
