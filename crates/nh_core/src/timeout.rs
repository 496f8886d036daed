use std::future::Future;
use std::time::Duration;

use crate::{Error, Result};

/// Runs `fut` with a deadline, turning an elapsed deadline into [`Error::Timeout`].
pub async fn with_timeout<T, F>(after: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            operation: operation.to_string(),
            after,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_deadline_maps_to_timeout() {
        let result: Result<()> = with_timeout(Duration::from_secs(5), "generate", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(Error::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_inner_result_passes_through() {
        let ok = with_timeout(Duration::from_secs(5), "embed", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<()> = with_timeout(Duration::from_secs(5), "embed", async {
            Err(Error::Inference("boom".to_string()))
        })
        .await;
        assert!(matches!(err, Err(Error::Inference(_))));
    }
}
