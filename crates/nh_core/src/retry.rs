use std::future::Future;
use std::time::Duration;

use crate::Result;

const MAX_DELAY_MS: u64 = 60_000;

/// Runs `operation`, retrying up to `max_retries` more times while the error
/// is transient. The pause doubles per attempt from `base_delay` with ±25 %
/// jitter, capped at 60 s.
pub async fn retry_with_backoff<T, F, Fut>(max_retries: u32, base_delay: Duration, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let base_ms = u64::try_from(base_delay.as_millis()).unwrap_or(MAX_DELAY_MS);
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_ms.saturating_mul(1u64 << (attempt - 1).min(10)).min(MAX_DELAY_MS);
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(attempt, max_retries, delay_ms, error = %err, "🔁 Transient error, retrying");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
