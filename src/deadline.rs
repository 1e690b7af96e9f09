//! Time budgets for remote calls and subprocesses

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Await `fut`, failing with [`Error::Timeout`] once `after` elapses.
///
/// The future is dropped on expiry, which kills child processes spawned
/// with `kill_on_drop` and aborts in-flight HTTP requests.
pub async fn bounded<T, F>(operation: impl Into<String>, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            operation: operation.into(),
            after,
        }),
    }
}
