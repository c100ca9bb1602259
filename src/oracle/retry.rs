use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::OracleError;

/// Bounded exponential backoff for transient oracle failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: Duration::from_secs(1),
            min_wait: Duration::from_secs(4),
            max_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::ZERO,
            min_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
        }
    }

    /// Wait after the `failures`-th failed attempt: `multiplier * 2^(failures - 1)`,
    /// clamped to `[min_wait, max_wait]`
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(31);
        let raw = self.multiplier.saturating_mul(1u32 << exponent);
        raw.max(self.min_wait).min(self.max_wait.max(self.min_wait))
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `op`, retrying transient failures under `policy`.
///
/// Fatal errors return immediately. When every attempt fails transiently the
/// result is [`OracleError::Exhausted`] carrying the last message.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, OracleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OracleError>>,
{
    let max_attempts = policy.attempts();
    let mut failures = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => {
                failures += 1;
                if failures >= max_attempts {
                    return Err(OracleError::Exhausted {
                        attempts: failures,
                        last: err.detail().to_string(),
                    });
                }
                let wait = policy.backoff(failures);
                warn!(
                    label,
                    attempt = failures,
                    wait_ms = wait.as_millis() as u64,
                    error = %err.detail(),
                    "Transient oracle failure, retrying"
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}
