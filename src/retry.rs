//! Retry utilities with exponential backoff
//!
//! The agent never retries on its own: a failed [`send`](crate::Agent::send)
//! is returned to the caller as-is. Callers that want retries wrap the call
//! themselves.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tool_agent::retry::{retry_with_backoff_conditional, RetryConfig};
//! use tool_agent::{Agent, AgentOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> tool_agent::Result<()> {
//! let config = RetryConfig::default()
//!     .with_max_attempts(3)
//!     .with_initial_delay(Duration::from_millis(500));
//! let options = AgentOptions::builder().build()?;
//! let options = &options;
//!
//! let response = retry_with_backoff_conditional(config, || async move {
//!     let mut agent = Agent::new(options.clone())?;
//!     agent.add_user_message("Hello");
//!     agent.send().await
//! })
//! .await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```
//!
//! A failed `send` leaves the history untouched, so calling it again on the
//! same agent resubmits the same request.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Growth factor applied per attempt
    pub backoff_multiplier: f64,

    /// Fraction of the delay randomized around its nominal value (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Clamped to 0.0..=1.0
    pub fn with_jitter_factor(mut self, jitter: f64) -> Self {
        self.jitter_factor = jitter.clamp(0.0, 1.0);
        self
    }

    /// Delay to wait after the zero-based `attempt` failed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let nominal_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let capped_ms = nominal_ms.min(self.max_delay.as_millis() as f64);

        let spread = capped_ms * self.jitter_factor;
        let offset = rand::random::<f64>() * spread - spread / 2.0;

        Duration::from_millis((capped_ms + offset).max(0.0) as u64)
    }
}

async fn run_with_backoff<F, Fut, T, P>(
    config: RetryConfig,
    mut operation: F,
    should_retry: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    let mut last_error = None;

    for attempt in 0..config.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !should_retry(&err) {
                    return Err(err);
                }
                log::debug!(
                    "Attempt {} of {} failed: {}",
                    attempt + 1,
                    config.max_attempts,
                    err
                );
                last_error = Some(err);

                if attempt + 1 < config.max_attempts {
                    sleep(config.delay_for_attempt(attempt)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::other("retry attempted zero times")))
}

/// Retry `operation` on any error until it succeeds or attempts run out.
///
/// Returns the last error when every attempt failed.
pub async fn retry_with_backoff<F, Fut, T>(config: RetryConfig, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    run_with_backoff(config, operation, |_| true).await
}

/// Whether an error is worth retrying.
///
/// Network failures, timeouts, rate limiting (429) and provider-side (5xx)
/// responses are transient. Everything else, including authentication and
/// other 4xx responses, is not.
pub fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Http(_) | Error::Timeout => true,
        Error::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Like [`retry_with_backoff`], but gives up immediately on errors that
/// [`is_retryable_error`] rejects.
pub async fn retry_with_backoff_conditional<F, Fut, T>(
    config: RetryConfig,
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    run_with_backoff(config, operation, is_retryable_error).await
}
