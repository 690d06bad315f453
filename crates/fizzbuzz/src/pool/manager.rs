//! Semaphore-bounded worker pool for per-number evaluation tasks.
//!
//! This module defines the [`WorkerPool`] struct, which owns the two
//! process-wide resources every evaluation shares: the runtime that tasks are
//! spawned onto and the counting semaphore that caps how many of them may be
//! runnable at once. Both are constructed explicitly and handed to the
//! evaluator, so tests can build a pool with a tiny capacity.
//!
//! Shutdown is coordinated through a shared [`CancellationToken`]. Request
//! tokens are derived from it, so cancelling the pool also elapses the deadline
//! of every in-flight evaluation.

use super::worker::run_slot;
use crate::Deadline;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::{
    runtime::Handle,
    sync::{OwnedSemaphorePermit, Semaphore},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

/// A bounded pool of evaluation tasks.
///
/// Capacity `K` bounds how many tasks hold a permit at the same time. Tasks
/// are spawned onto the pool's runtime handle, which is expected to be a
/// multi-threaded runtime so that permit holders run in parallel.
#[derive(Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
    runtime: Handle,
    shutdown_token: CancellationToken,
    in_flight: AtomicUsize,
}

impl WorkerPool {
    /// Constructs a pool of `capacity` permits that spawns onto `runtime`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds [`Semaphore::MAX_PERMITS`].
    pub fn new(capacity: usize, runtime: Handle) -> Self {
        assert!(capacity > 0, "worker pool capacity must be greater than 0");
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            runtime,
            shutdown_token: CancellationToken::new(),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Constructs a pool on the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime, or for the reasons
    /// listed on [`WorkerPool::new`].
    pub fn with_current_runtime(capacity: usize) -> Self {
        Self::new(capacity, Handle::current())
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a task.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Number of evaluations currently running against this pool.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Returns a fresh token for a single request.
    ///
    /// The token is a child of the pool's shutdown token: it can be cancelled
    /// on its own (e.g. when the client disconnects), and is cancelled
    /// automatically when the pool shuts down.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown_token.child_token()
    }

    /// Waits for a free permit and holds it until the returned guard drops.
    ///
    /// Evaluations take one permit per spawned task. Holding one from outside
    /// reserves capacity the same way.
    ///
    /// Returns `None` once the pool has been shut down.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).acquire_owned().await.ok()
    }

    /// Spawns the evaluation of `n` while holding `permit`.
    ///
    /// The permit is released when the task finishes, whether it classified
    /// `n` or skipped it because `deadline` had elapsed.
    pub(crate) fn spawn(
        &self,
        n: i64,
        deadline: Arc<Deadline>,
        permit: OwnedSemaphorePermit,
    ) -> JoinHandle<Option<String>> {
        self.runtime.spawn(async move { run_slot(n, &deadline, permit) })
    }

    /// Marks one evaluation as in flight until the returned guard is dropped.
    pub(crate) fn track(&self) -> InFlight<'_> {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        InFlight { pool: self }
    }

    /// Stops the pool.
    ///
    /// - Cancels the shutdown token, elapsing the deadline of every request
    ///   token derived from it.
    /// - Closes the semaphore so that evaluations blocked on a permit stop
    ///   spawning; their remaining slots stay empty.
    ///
    /// Calling this more than once is harmless.
    pub fn shutdown(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Shutting down worker pool ({} evaluations in flight)",
            self.in_flight()
        );

        self.shutdown_token.cancel();
        self.permits.close();
    }
}

/// Guard returned by [`WorkerPool::track`].
pub(crate) struct InFlight<'a> {
    pool: &'a WorkerPool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.pool.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
