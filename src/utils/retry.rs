//! Retry utilities for outbound calls
//!
//! Two independent policies are applied to every Lichess request:
//!
//! - transient errors (network, 5xx, 404): exponential backoff, 2s/4s/8s
//! - rate limits (429): fixed 65s delay, up to 10 retries
//!
//! [`RetryStack`] nests the rate-limit wrapper inside the transient wrapper so
//! each keeps its own attempt budget.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::ApiError;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Delay in milliseconds before the first retry
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,

    /// Multiplier applied per attempt (1.0 gives a fixed delay)
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::transient()
    }
}

impl RetryConfig {
    /// Exponential policy for transient errors: 2s, 4s, 8s
    pub fn transient() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 60_000,
            backoff_multiplier: 2.0,
        }
    }

    /// Fixed policy for rate-limit responses: 10 retries, 65s apart
    pub fn rate_limit() -> Self {
        Self::fixed(10, 65_000)
    }

    /// Fixed delay between every attempt
    pub fn fixed(max_retries: u32, delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            backoff_multiplier: 1.0,
        }
    }

    /// Create a retry configuration with custom delays
    pub fn with_delays(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            backoff_multiplier: 2.0,
        }
    }

    /// Calculate delay for a given attempt (1-based); attempt 0 has no delay
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            let exponential =
                self.base_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);
            (exponential as u64).min(self.max_delay_ms)
        };

        Duration::from_millis(delay_ms)
    }
}

/// Execute an operation, retrying only the errors `should_retry` selects
///
/// Errors rejected by the predicate are returned immediately. When the budget
/// is exhausted the last error is returned.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation: F,
    should_retry: P,
) -> Result<T, E>
where
    E: Display,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(attempt = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }

                if attempt >= config.max_retries {
                    warn!(
                        attempts = attempt + 1,
                        max_retries = config.max_retries,
                        error = %e,
                        "Retry budget exhausted"
                    );
                    return Err(e);
                }

                attempt += 1;
                let delay = config.calculate_delay(attempt);
                warn!(
                    attempt = attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, will retry"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// The transient and rate-limit policies, applied together to one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryStack {
    pub transient: RetryConfig,
    pub rate_limit: RetryConfig,
}

impl Default for RetryStack {
    fn default() -> Self {
        Self {
            transient: RetryConfig::transient(),
            rate_limit: RetryConfig::rate_limit(),
        }
    }
}

impl RetryStack {
    /// A stack that never retries
    pub fn none() -> Self {
        Self {
            transient: RetryConfig::fixed(0, 0),
            rate_limit: RetryConfig::fixed(0, 0),
        }
    }

    /// Run `operation` under both policies
    ///
    /// A 429 is retried by the inner wrapper and never reaches the transient
    /// budget; a transient failure passes straight through the inner wrapper.
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let operation = &operation;
        let rate_limit = &self.rate_limit;

        with_retry_if(
            &self.transient,
            move || with_retry_if(rate_limit, operation, ApiError::is_rate_limited),
            ApiError::is_transient,
        )
        .await
    }
}
