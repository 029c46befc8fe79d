use std::future::Future;
use std::time::Duration;

use log::{debug, error};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Bounded exponential backoff around a whole fetch-and-persist operation.
/// Only transport-class failures are retried; everything else surfaces on
/// the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub async fn run<F, Fut, T>(&self, cancel: &CancellationToken, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.initial_delay;
        let mut attempt = 1u32;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                result = operation() => result,
            };

            match result {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Succeeded after {attempt} attempts");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    error!(
                        "Attempt {attempt}/{}: {e}, retrying in {delay:?}",
                        self.max_attempts
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = sleep(delay) => {}
                    }
                    delay = delay.mul_f64(self.multiplier).min(self.max_delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
