//! Explicit swallow-and-default for non-critical reads.

use std::future::Future;

use crate::error::ApiError;

/// Await `operation`, substituting `fallback` for any error.
///
/// The error is logged at `warn` with the operation name and never
/// propagates. Use it only for reads whose absence the caller can render
/// (an empty list, a missing summary); mutations must surface their errors.
pub async fn try_default<T, F>(name: &'static str, operation: F, fallback: T) -> T
where
    F: Future<Output = Result<T, ApiError>>,
{
    match operation.await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(operation = name, error = %e, "request failed; using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_passes_through() {
        let value = try_default("ok", async { Ok::<_, ApiError>(vec![1, 2]) }, Vec::new()).await;
        assert_eq!(value, vec![1, 2]);
    }

    #[tokio::test]
    async fn failure_yields_fallback() {
        let value = try_default(
            "fails",
            async { Err::<Vec<i32>, _>(ApiError::from_status(500, None)) },
            vec![0],
        )
        .await;
        assert_eq!(value, vec![0]);
    }
}
