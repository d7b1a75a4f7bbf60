//! Bounded fixed-delay retry loop.
//!
//! ```text
//! Idle → Attempting(1) → Success
//!                      → Attempting(2) → ... → Attempting(max) → Exhausted
//! ```

use hypernet_types::RetryConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Attempt budget and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first, at least 1
    pub max_attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.delay_ms))
    }
}

/// Position of a retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    Attempting(u32),
}

impl RetryState {
    /// Enter the first attempt. A loop already in flight stays where it is.
    pub fn start(self) -> Self {
        match self {
            Self::Idle => Self::Attempting(1),
            attempting => attempting,
        }
    }

    /// State after the current attempt failed, or `None` once the budget is spent.
    pub fn after_failure(self, policy: &RetryPolicy) -> Option<Self> {
        match self {
            Self::Attempting(n) if n < policy.max_attempts => Some(Self::Attempting(n + 1)),
            _ => None,
        }
    }

    /// 1-based attempt number, 0 before the first attempt.
    pub fn attempt(self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::Attempting(n) => n,
        }
    }
}

/// Terminal result of a retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    Success { value: T, attempts: u32 },
    Exhausted { last_error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Run `op` until it succeeds, fails with an error `retryable` rejects, or
/// the policy is exhausted.
///
/// `op` receives the 1-based attempt number. No delay follows the final
/// failure.
pub async fn retry_fixed<T, E, R, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    retryable: R,
    mut op: F,
) -> RetryOutcome<T, E>
where
    R: Fn(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut state = RetryState::Idle.start();
    loop {
        let attempt = state.attempt();

        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        label,
                        attempt,
                        max_attempts = policy.max_attempts,
                        "Fetch succeeded after retry"
                    );
                }
                return RetryOutcome::Success { value, attempts: attempt };
            },
            Err(e) if !retryable(&e) => {
                tracing::error!(label, attempts = attempt, error = %e, "Fetch failed, not retryable");
                return RetryOutcome::Exhausted { last_error: e, attempts: attempt };
            },
            Err(e) => match state.after_failure(policy) {
                Some(next) => {
                    tracing::warn!(
                        label,
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = policy.delay.as_millis() as u64,
                        error = %e,
                        "Fetch attempt failed, retrying"
                    );
                    sleep(policy.delay).await;
                    state = next;
                },
                None => {
                    tracing::error!(label, attempts = attempt, error = %e, "Fetch retries exhausted");
                    return RetryOutcome::Exhausted { last_error: e, attempts: attempt };
                },
            },
        }
    }
}
