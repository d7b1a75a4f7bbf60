//! TTL cache for a single credential value.

use hypernet_types::{CredentialError, RefreshPolicy};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::retry::{retry_fixed, RetryOutcome, RetryPolicy};
use super::source::CredentialSource;

/// Last fetched value and its expiry.
///
/// The value is kept past expiry so a failed refresh can fall back to it.
#[derive(Debug, Clone)]
pub struct CachedCredential<T> {
    pub value: Option<T>,
    pub expires_at: Option<Instant>,
}

impl<T> Default for CachedCredential<T> {
    fn default() -> Self {
        Self { value: None, expires_at: None }
    }
}

impl<T: Clone> CachedCredential<T> {
    /// The value if it has not expired at `now`.
    pub fn fresh_at(&self, now: Instant) -> Option<T> {
        match (&self.value, self.expires_at) {
            (Some(value), Some(expires_at)) if now < expires_at => Some(value.clone()),
            _ => None,
        }
    }
}

/// A refresh that ran out of attempts.
#[derive(Debug, Clone)]
pub struct RefreshFailure<T> {
    pub last_error: CredentialError,
    pub attempts: u32,
    /// Expired value still held by the cache, if any
    pub stale: Option<T>,
}

/// Lock-guarded credential slot with retrying refresh.
///
/// The state lock only covers the expiry check and the write-back. With
/// [`RefreshPolicy::SingleFlight`] a second gate serializes refreshes and
/// waiters re-check the slot before fetching themselves.
#[derive(Debug)]
pub struct CredentialCache<T> {
    label: &'static str,
    ttl: Duration,
    retry: RetryPolicy,
    policy: RefreshPolicy,
    state: Mutex<CachedCredential<T>>,
    refresh_gate: Mutex<()>,
}

impl<T> CredentialCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(label: &'static str, ttl: Duration, retry: RetryPolicy, policy: RefreshPolicy) -> Self {
        Self {
            label,
            ttl,
            retry,
            policy,
            state: Mutex::new(CachedCredential::default()),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value, if still fresh. Never fetches.
    pub async fn peek(&self) -> Option<T> {
        self.state.lock().await.fresh_at(Instant::now())
    }

    /// Drop the cached value and its expiry.
    pub async fn invalidate(&self) {
        *self.state.lock().await = CachedCredential::default();
    }

    /// Return the fresh value, or fetch a new one through `source`.
    ///
    /// `force` skips the freshness check and always fetches.
    pub async fn get_or_refresh(
        &self,
        source: &dyn CredentialSource<T>,
        force: bool,
    ) -> Result<T, RefreshFailure<T>> {
        if !force {
            if let Some(value) = self.peek().await {
                tracing::debug!(label = self.label, "Cache hit");
                return Ok(value);
            }
        }

        match self.policy {
            RefreshPolicy::Concurrent => self.refresh(source).await,
            RefreshPolicy::SingleFlight => {
                let _gate = self.refresh_gate.lock().await;

                // Another caller may have refreshed while we waited on the gate
                if !force {
                    if let Some(value) = self.peek().await {
                        tracing::debug!(label = self.label, "Refreshed by a concurrent caller");
                        return Ok(value);
                    }
                }
                self.refresh(source).await
            },
        }
    }

    async fn refresh(&self, source: &dyn CredentialSource<T>) -> Result<T, RefreshFailure<T>> {
        tracing::debug!(label = self.label, source = source.name(), "Refreshing credential");

        let outcome = retry_fixed(&self.retry, self.label, CredentialError::is_transient, |_| {
            source.fetch()
        })
        .await;
        match outcome {
            RetryOutcome::Success { value, attempts } => {
                let mut state = self.state.lock().await;
                state.value = Some(value.clone());
                state.expires_at = Some(Instant::now() + self.ttl);
                tracing::info!(
                    label = self.label,
                    attempts,
                    ttl_secs = self.ttl.as_secs(),
                    "Credential refreshed"
                );
                Ok(value)
            },
            RetryOutcome::Exhausted { last_error, attempts } => {
                let stale = self.state.lock().await.value.clone();
                Err(RefreshFailure { last_error, attempts, stale })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::future::join_all;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::{advance, sleep};

    const TTL: Duration = Duration::from_secs(300);

    /// Fails the first `fail_first` calls, then returns `value-<call>`.
    struct ScriptedSource {
        calls: AtomicU32,
        fail_first: u32,
        latency: Duration,
    }

    impl ScriptedSource {
        fn new(fail_first: u32) -> Self {
            Self { calls: AtomicU32::new(0), fail_first, latency: Duration::ZERO }
        }

        fn slow(latency: Duration) -> Self {
            Self { latency, ..Self::new(0) }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialSource<String> for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch(&self) -> Result<String, CredentialError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.latency.is_zero() {
                sleep(self.latency).await;
            }
            if n <= self.fail_first {
                Err(CredentialError::transport(format!("call {} failed", n)))
            } else {
                Ok(format!("value-{}", n))
            }
        }
    }

    fn cache(policy: RefreshPolicy) -> CredentialCache<String> {
        CredentialCache::new("test", TTL, RetryPolicy::new(3, Duration::from_secs(1)), policy)
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_reused_until_ttl() {
        let cache = cache(RefreshPolicy::SingleFlight);
        let source = ScriptedSource::new(0);

        assert_eq!(cache.get_or_refresh(&source, false).await.ok(), Some("value-1".to_string()));

        advance(TTL - Duration::from_secs(1)).await;
        assert_eq!(cache.get_or_refresh(&source, false).await.ok(), Some("value-1".to_string()));
        assert_eq!(source.calls(), 1);

        advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_or_refresh(&source, false).await.ok(), Some("value-2".to_string()));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_bypasses_ttl() {
        let cache = cache(RefreshPolicy::SingleFlight);
        let source = ScriptedSource::new(0);

        cache.get_or_refresh(&source, false).await.ok();
        advance(TTL - Duration::from_millis(1)).await;

        assert_eq!(cache.get_or_refresh(&source, true).await.ok(), Some("value-2".to_string()));
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.peek().await, Some("value-2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_caches() {
        let cache = cache(RefreshPolicy::SingleFlight);
        let source = ScriptedSource::new(2);
        let start = Instant::now();

        assert_eq!(cache.get_or_refresh(&source, false).await.ok(), Some("value-3".to_string()));
        assert_eq!(source.calls(), 3);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_attempts() {
        let cache = cache(RefreshPolicy::SingleFlight);
        let source = ScriptedSource::new(u32::MAX);

        let failure = cache.get_or_refresh(&source, false).await.err().expect("must fail");
        assert_eq!(failure.attempts, 3);
        assert!(failure.stale.is_none());
        assert!(matches!(failure.last_error, CredentialError::Transport { .. }));
        assert_eq!(source.calls(), 3);
        assert!(cache.peek().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_value_kept_as_stale() {
        let cache = cache(RefreshPolicy::SingleFlight);
        cache.get_or_refresh(&ScriptedSource::new(0), false).await.ok();

        advance(TTL).await;
        assert!(cache.peek().await.is_none());

        let failure =
            cache.get_or_refresh(&ScriptedSource::new(u32::MAX), false).await.err().expect("must fail");
        assert_eq!(failure.stale, Some("value-1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_dedupes_concurrent_misses() {
        let cache = cache(RefreshPolicy::SingleFlight);
        let source = ScriptedSource::slow(Duration::from_millis(200));

        let results = join_all((0..5).map(|_| cache.get_or_refresh(&source, false))).await;

        assert_eq!(source.calls(), 1);
        assert!(results.iter().all(|r| r.as_ref().ok() == Some(&"value-1".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_policy_fetches_per_caller() {
        let cache = cache(RefreshPolicy::Concurrent);
        let source = ScriptedSource::slow(Duration::from_millis(200));

        let results = join_all((0..5).map(|_| cache.get_or_refresh(&source, false))).await;

        assert_eq!(source.calls(), 5);
        assert!(results.iter().all(Result::is_ok));
        // last writer wins
        assert!(cache.peek().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate() {
        let cache = cache(RefreshPolicy::SingleFlight);
        let source = ScriptedSource::new(0);
        cache.get_or_refresh(&source, false).await.ok();

        cache.invalidate().await;
        assert!(cache.peek().await.is_none());
        assert_eq!(cache.get_or_refresh(&source, false).await.ok(), Some("value-2".to_string()));
    }

    struct FinalSource(AtomicU32);

    #[async_trait]
    impl CredentialSource<String> for FinalSource {
        fn name(&self) -> &'static str {
            "final"
        }

        async fn fetch(&self) -> Result<String, CredentialError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(CredentialError::SignTokenUnavailable { attempts: 3, last_error: "upstream".to_string() })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_not_retried() {
        let cache = cache(RefreshPolicy::SingleFlight);
        let source = FinalSource(AtomicU32::new(0));

        let failure = cache.get_or_refresh(&source, false).await.err().expect("must fail");
        assert_eq!(failure.attempts, 1);
        assert_eq!(source.0.load(Ordering::SeqCst), 1);
        assert!(matches!(failure.last_error, CredentialError::SignTokenUnavailable { .. }));
    }
}
