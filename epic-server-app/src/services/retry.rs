use std::{future::Future, time::Duration};

use crate::domain::{RepoError, RepoRetrieveError};

const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Errors that may clear up on their own, as opposed to answers from the store.
pub trait StorageFailure {
    fn is_storage_failure(&self) -> bool;
}

impl StorageFailure for RepoError {
    fn is_storage_failure(&self) -> bool {
        matches!(self, RepoError::StorageError(_))
    }
}

impl StorageFailure for RepoRetrieveError {
    fn is_storage_failure(&self) -> bool {
        matches!(self, RepoRetrieveError::StorageError(_))
    }
}

/// Runs a read against the store, retrying exactly once after a short pause
/// if the store itself failed. Only use this for idempotent operations.
pub async fn retry_once<T, E, F, Fut>(operation: &str, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: StorageFailure + std::fmt::Display,
{
    match attempt().await {
        Err(e) if e.is_storage_failure() => {
            log::warn!("{} failed, retrying once: {}", operation, e);
            tokio::time::sleep(RETRY_DELAY).await;
            attempt().await
        }
        other => other,
    }
}
