//! Timeout wrapper for browser operations

use std::future::Future;
use std::time::Duration;

use super::types::FetchError;

/// Run a page operation under `tokio::time::timeout`
///
/// An elapsed timer becomes `FetchError::Timeout` naming the operation; errors
/// from the operation itself pass through unchanged.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            operation: operation_name.to_string(),
            secs: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_elapsed_operation_is_timeout() {
        let result: Result<(), FetchError> = with_page_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            Duration::from_millis(10),
            "Page navigation",
        )
        .await;

        assert!(matches!(result, Err(FetchError::Timeout { ref operation, .. }) if operation == "Page navigation"));
    }

    #[tokio::test]
    async fn test_operation_error_passes_through() {
        let result: Result<(), FetchError> = with_page_timeout(
            async { Err(FetchError::Navigation("net::ERR_NAME_NOT_RESOLVED".into())) },
            Duration::from_secs(1),
            "Page navigation",
        )
        .await;

        assert!(matches!(result, Err(FetchError::Navigation(_))));
    }
}
