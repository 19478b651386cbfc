//! Retry logic for transient store failures.
//!
//! A failed per-video update must not abort the whole batch: transient
//! errors are retried with exponential backoff, permanent errors surface to
//! the caller immediately.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Execute a store operation with automatic retry on transient failures.
///
/// # Example
/// ```ignore
/// use fifthquarter_rust_core::db::retry::execute_with_retry;
///
/// let result = execute_with_retry(
///     || async { store.apply_outcome(&video_id, band_id, None, score).await },
///     3, // max attempts
/// )
/// .await?;
/// ```
pub async fn execute_with_retry<F, Fut, T>(mut f: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_attempts && is_retriable_error(&e) => {
                let backoff_ms = 100_u64 * 2_u64.pow(attempt - 1);
                warn!(
                    "Store operation failed (attempt {}/{}): {}. Retrying in {}ms",
                    attempt, max_attempts, e, backoff_ms
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Check if a store error is retriable
fn is_retriable_error(e: &anyhow::Error) -> bool {
    let err_str = e.to_string().to_lowercase();

    // Connection-related errors that are likely transient
    err_str.contains("connection")
        || err_str.contains("timeout")
        || err_str.contains("broken pipe")
        // PostgreSQL specific transient errors
        || err_str.contains("could not serialize")
        || err_str.contains("deadlock detected")
        || err_str.contains("too many clients")
        || err_str.contains("server closed the connection")
}
