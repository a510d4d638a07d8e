//! Retry policy for API requests

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;

/// Default cap on retries beyond the initial attempt.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff base.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

type RetryPredicate = Arc<dyn Fn(&ApiError) -> bool + Send + Sync>;

/// Exponential-backoff retry policy applied per request.
///
/// The delay before retry `n` (0-based) is `base_delay * 2^n`. Retries stop
/// once `max_retries` have been spent or the error is classified terminal.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    predicate: Option<RetryPredicate>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            predicate: None,
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("custom_predicate", &self.predicate.is_some())
            .finish()
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            predicate: None,
        }
    }

    /// Policy that never retries. Used for non-idempotent writes.
    pub fn none() -> Self {
        Self::new(0, DEFAULT_BASE_DELAY)
    }

    /// Replace the default error classification with a custom predicate.
    /// The attempt cap still applies.
    #[allow(dead_code)]
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&ApiError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Whether `err` warrants another attempt after `attempt` retries have
    /// already been spent.
    pub fn should_retry(&self, err: &ApiError, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        match &self.predicate {
            Some(predicate) => predicate(err),
            None => default_should_retry(err),
        }
    }

    /// Backoff to observe before retry `attempt` (0-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Default classification: retry when the server never responded, rate
/// limited us, or failed with a 5xx. Other client errors are terminal.
fn default_should_retry(err: &ApiError) -> bool {
    match err {
        ApiError::Network(_) => true,
        ApiError::RateLimited => true,
        ApiError::Server { code, .. } => *code >= 500,
        _ => false,
    }
}
