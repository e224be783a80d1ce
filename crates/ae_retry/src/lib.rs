use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use ae_core::{Error, Result};

pub mod document;

pub use document::{read_document, write_document};

/// Called once per failed attempt, before the backoff sleep. Keeps the
/// retry core free of any direct output-stream dependency.
pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, name: &str, attempt: u32, max_attempts: u32, error: &Error, delay: Duration);
}

/// Default observer: reports through tracing.
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_retry(&self, name: &str, attempt: u32, max_attempts: u32, error: &Error, delay: Duration) {
        warn!(
            "⏳ {} failed (attempt {}/{}): {}; retrying in {:?}",
            name, attempt, max_attempts, error, delay
        );
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound of the uniform jitter added to every backoff sleep.
    pub jitter: Duration,
    /// Wall-clock budget for a single attempt. `None` waits out stalls.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            jitter: Duration::from_millis(1000),
            attempt_timeout: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, attempt_timeout: Option<Duration>) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// `base_delay * 2^attempt + uniform(0..jitter)`, zero-based attempt.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        // cap the shift so pathological attempt counts cannot overflow
        let exponential = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return exponential;
        }
        exponential + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
    }

    /// Run `op` until it succeeds or the attempt budget runs out.
    pub async fn run<T, F, Fut>(&self, name: &str, observer: &dyn RetryObserver, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run_validated(name, observer, op, |_| true).await
    }

    /// Like [`run`](Self::run), but a successful result that fails
    /// `validate` counts as a failed attempt. This is how truncation that
    /// slipped past the call signature gets caught.
    pub async fn run_validated<T, F, Fut, V>(
        &self,
        name: &str,
        observer: &dyn RetryObserver,
        mut op: F,
        validate: V,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        V: Fn(&T) -> bool,
    {
        let mut last = String::from("never attempted");
        for attempt in 0..self.max_attempts {
            let outcome = match self.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, op()).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Channel(format!(
                        "{} timed out after {:?}",
                        name, limit
                    ))),
                },
                None => op().await,
            };

            let error = match outcome {
                Ok(value) if validate(&value) => return Ok(value),
                Ok(_) => Error::Validation(format!("{} produced a rejected result", name)),
                Err(e) => e,
            };

            if !error.is_retryable() {
                return Err(error);
            }

            last = error.to_string();
            if attempt + 1 < self.max_attempts {
                let delay = self.backoff_delay(attempt);
                observer.on_retry(name, attempt + 1, self.max_attempts, &error, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(Error::RetryExhausted {
            attempts: self.max_attempts,
            last,
        })
    }
}
