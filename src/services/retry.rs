//! Bounded retry with per-call timeouts.
//!
//! Every outbound call goes through [`call_with_retry`]. Each attempt runs
//! under a deadline; an elapsed deadline is reported as
//! [`ProviderError::Timeout`] and retried like any other transient failure.
//! The pause between attempts is fixed, never grown.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::SafetyConfig;
use crate::providers::email::{ErrorClass, ProviderError};

/// Retry budget and deadlines for outbound calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Pause before each retry.
    pub delay: Duration,
    /// Deadline for a single attempt.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(100),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from the safety parameters and a call deadline.
    pub fn from_safety(safety: &SafetyConfig, timeout: Duration) -> Self {
        Self {
            max_retries: safety.max_retries,
            delay: safety.rate_limit_delay,
            timeout,
        }
    }

    /// Upper bound on attempts for one call.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Why a retried call gave up.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryError {
    /// The cancellation signal fired before the call could finish.
    #[error("cancelled after {attempts} attempts")]
    Cancelled {
        /// Attempts issued before cancellation.
        attempts: u32,
    },

    /// The last attempt failed and no retry remains.
    #[error("{error} (after {attempts} attempts)")]
    Failed {
        /// Error from the last attempt.
        error: ProviderError,
        /// Attempts issued.
        attempts: u32,
    },
}

impl RetryError {
    /// Attempts issued before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Cancelled { attempts } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Runs `call` until it succeeds, fails permanently, or the budget runs out.
///
/// Transient errors are retried after `policy.delay`. Permanent and fatal
/// errors return immediately. Cancellation is checked before every attempt
/// and interrupts the pause between attempts. `on_retry` sees the attempt
/// number that just failed and its error.
pub async fn call_with_retry<T, F, Fut, R>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut on_retry: R,
    mut call: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
    R: FnMut(u32, &ProviderError),
{
    let mut attempts = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled { attempts });
        }
        attempts += 1;

        let error = match tokio::time::timeout(policy.timeout, call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) => error,
            Err(_) => ProviderError::Timeout(policy.timeout),
        };

        if error.class() != ErrorClass::Transient || attempts >= policy.max_attempts() {
            return Err(RetryError::Failed { error, attempts });
        }
        on_retry(attempts, &error);

        tokio::select! {
            _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
            _ = tokio::time::sleep(policy.delay) => {}
        }
    }
}
