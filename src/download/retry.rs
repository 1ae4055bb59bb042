//! Sequential retry for fallible async operations.
//!
//! [`RetryPolicy`] runs an operation up to `max_attempts` times and returns the
//! first success. When every attempt fails, the error from the final attempt is
//! returned unchanged; earlier errors are logged and dropped.
//!
//! # Example
//!
//! ```
//! use gallery_core::download::RetryPolicy;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::new(3)?;
//! let value: Result<u32, String> = policy.run(|attempt| async move {
//!     if attempt < 2 { Err(format!("attempt {attempt} failed")) } else { Ok(attempt) }
//! }).await;
//! assert_eq!(value, Ok(2));
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::CrawlError;

/// Default maximum attempts for detail pages and image downloads.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Configuration for sequential retries.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `delay`: none (attempts run back to back)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Pause between a failed attempt and the next one.
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` attempts with no delay.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidLimit`] when `max_attempts` is zero.
    pub fn new(max_attempts: u32) -> Result<Self, CrawlError> {
        if max_attempts == 0 {
            return Err(CrawlError::InvalidLimit {
                name: "max_attempts",
                value: 0,
            });
        }
        Ok(Self {
            max_attempts,
            delay: Duration::ZERO,
        })
    }

    /// Sets a fixed pause between attempts.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the pause between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` until it succeeds or the attempts are used up.
    ///
    /// `op` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt when all attempts fail.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts => {
                    debug!(
                        attempt,
                        max = self.max_attempts,
                        error = %error,
                        "attempt failed, retrying"
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
                Err(error) => {
                    debug!(attempt, error = %error, "max attempts exhausted");
                    return Err(error);
                }
            }
        }
    }
}
