use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    /// Delay before retry number `attempt` (1-based): `factor^(attempt-1)` seconds.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        Duration::from_millis((self.backoff_factor.powi(exponent) * 1000.0) as u64)
    }
}

/// Errors that may go away if the request is sent again.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

pub async fn send_with_retries<T, E, F, Fut>(policy: RetryPolicy, mut request: F) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match request().await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_transient() && attempts <= policy.max_retries => {
                let backoff_time = policy.backoff(attempts);
                tracing::warn!(
                    "Request failed (attempt {}): {}; retrying in {} ms",
                    attempts,
                    e,
                    backoff_time.as_millis()
                );
                tokio::time::sleep(backoff_time).await;
            }
            Err(e) => return Err(e),
        }
    }
}
