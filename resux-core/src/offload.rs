//! Bounded worker pool for blocking provider calls.
//!
//! Every blocking call made by the core goes through [`Offloader::run`]. A call
//! first waits for one of a fixed number of permits, then runs on tokio's
//! blocking thread pool. The permit travels with the blocking closure, so it is
//! released when the provider call actually returns, even if the awaiting
//! future was dropped in the meantime. Dropping the future never aborts a call
//! that already started.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::trace;

use crate::error::{GitError, Result};

/// Default number of blocking provider calls allowed in flight at once.
pub const DEFAULT_MAX_BLOCKING_CALLS: usize = 16;

#[derive(Debug, Clone)]
pub struct Offloader {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl Offloader {
    /// Creates a pool admitting at most `capacity` concurrent blocking calls.
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of calls that could start right now without waiting.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Runs `call` on a blocking worker once a permit is available.
    ///
    /// The closure's return value is handed back as is; provider errors are
    /// expected inside it (`Result<R, ProviderError>`), so callers typically
    /// write `offloader.run(..).await??`. A panic inside `call` resumes on the
    /// awaiting task.
    pub async fn run<F, R>(&self, call: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| GitError::WorkerPoolClosed)?;
        trace!(available = self.permits.available_permits(), "dispatching blocking call");

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            call()
        });

        match handle.await {
            Ok(value) => Ok(value),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(GitError::WorkerCancelled),
        }
    }

    /// Stops admitting new calls. Calls already holding a permit finish normally.
    pub fn close(&self) {
        self.permits.close();
    }
}

impl Default for Offloader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLOCKING_CALLS)
    }
}
