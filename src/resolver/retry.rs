//! Bounded retry with exponential backoff and jitter for network calls.

use crate::resolver::error::ResolveError;
use rand::Rng;
use std::time::Duration;
use tracing::trace;

/// Runs `op` up to `retries + 1` times. Only errors classified as retryable
/// are retried; everything else fails immediately. When the budget runs out
/// the last retryable error is wrapped in `RetriesExhausted`.
pub fn with_retry<T>(
    retries: u32,
    base_delay: Duration,
    mut op: impl FnMut() -> Result<T, ResolveError>,
) -> Result<T, ResolveError> {
    let mut attempt: u32 = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < retries => {
                let delay = backoff_delay(attempt, base_delay);
                trace!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "Retrying");
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(err) if err.is_retryable() => {
                return Err(ResolveError::RetriesExhausted {
                    attempts: attempt + 1,
                    source: Box::new(err),
                });
            }
            Err(err) => return Err(err),
        }
    }
}

/// Exponential in the attempt index, floored at the base delay, plus uniform
/// jitter over `[0, max(25ms, base_delay))` so concurrent callers never
/// retry in lockstep.
fn backoff_delay(attempt: u32, base_delay: Duration) -> Duration {
    let exponential = base_delay.saturating_mul(2u32.saturating_pow(attempt));
    let floored = exponential.max(base_delay);
    let jitter_bound = (base_delay.as_millis() as u64).max(25);
    let jitter = rand::thread_rng().gen_range(0..jitter_bound);
    floored + Duration::from_millis(jitter)
}
