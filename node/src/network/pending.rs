// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::future::Future;

use tokio::task::JoinHandle;

use crate::errors::FlockError;

/// A request running in the background.
///
/// Nothing is delivered by callback: poll with [`test`](Self::test) or
/// block on [`wait`](Self::wait). Dropping the handle lets the request run
/// to completion and discards its result.
pub struct PendingRequest<T> {
    handle: JoinHandle<Result<T, FlockError>>,
}

impl<T: Send + 'static> PendingRequest<T> {
    pub(crate) fn spawn<F>(request: F) -> Self
    where
        F: Future<Output = Result<T, FlockError>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(request),
        }
    }

    /// True once the result is ready. Never blocks.
    pub fn test(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<T, FlockError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(FlockError::Internal(format!("request task failed: {e}"))),
        }
    }
}
