//! Injectable task scheduling.
//!
//! Sessions never block the caller: encoding and logo decoding run as tasks
//! handed to a [`Scheduler`], and CPU-bound work inside those tasks goes
//! through [`Scheduler::spawn_blocking`]. [`TokioScheduler`] is the production
//! choice; [`ManualScheduler`] queues tasks so callers decide when, and in
//! which order, each one runs, and needs no runtime at all.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::channel::oneshot;
use futures::future::BoxFuture;

use crate::error::{SessionError, SessionResult};

/// A unit of scheduled work.
pub type Task = BoxFuture<'static, ()>;

/// A blocking job run off the async path.
pub type BlockingJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks asynchronously.
pub trait Scheduler: Send + Sync {
    /// Schedule a task. Must not block.
    fn spawn(&self, task: Task);

    /// Run a blocking job. The returned future resolves once the job has
    /// finished (or failed).
    fn spawn_blocking(&self, job: BlockingJob) -> Task;
}

/// Run `job` through `scheduler` and return its result.
///
/// Returns `None` if the job did not run to completion.
pub async fn run_blocking<T, F>(scheduler: &dyn Scheduler, job: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    scheduler
        .spawn_blocking(Box::new(move || {
            let _ = tx.send(job());
        }))
        .await;
    rx.await.ok()
}

/// Spawns tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Use the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns an error when called outside a tokio runtime.
    pub fn try_current() -> SessionResult<Self> {
        tokio::runtime::Handle::try_current()
            .map(Self::from_handle)
            .map_err(|e| SessionError::NoRuntime(e.to_string()))
    }

    /// Use an explicit runtime handle.
    #[must_use]
    pub fn from_handle(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn spawn(&self, task: Task) {
        // Detached: results are delivered through session state, not the handle.
        drop(self.handle.spawn(task));
    }

    fn spawn_blocking(&self, job: BlockingJob) -> Task {
        let handle = self.handle.spawn_blocking(job);
        Box::pin(async move {
            if let Err(err) = handle.await {
                tracing::warn!(%err, "Blocking job failed");
            }
        })
    }
}

/// Queues tasks until the owner runs them.
///
/// Blocking jobs run inline when the task awaiting them is polled, so any
/// executor can drive the queue.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<Task>>,
}

impl ManualScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Task>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Remove the task at `index` (0 = oldest) without running it.
    #[must_use]
    pub fn take(&self, index: usize) -> Option<Task> {
        self.queue().remove(index)
    }

    /// Run the oldest queued task to completion. Returns false if none queued.
    pub async fn run_next(&self) -> bool {
        let task = self.queue().pop_front();
        match task {
            Some(task) => {
                task.await;
                true
            }
            None => false,
        }
    }

    /// Run the newest queued task to completion. Returns false if none queued.
    pub async fn run_last(&self) -> bool {
        let task = self.queue().pop_back();
        match task {
            Some(task) => {
                task.await;
                true
            }
            None => false,
        }
    }

    /// Run queued tasks oldest-first until the queue is empty, including any
    /// tasks scheduled while running.
    pub async fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next().await {
            ran += 1;
        }
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn spawn(&self, task: Task) {
        self.queue().push_back(task);
    }

    fn spawn_blocking(&self, job: BlockingJob) -> Task {
        Box::pin(async move { job() })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counting_task(counter: &Arc<AtomicUsize>, value: usize) -> Task {
        let counter = Arc::clone(counter);
        Box::pin(async move {
            counter.store(value, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_manual_scheduler_order_is_caller_controlled() {
        let scheduler = ManualScheduler::new();
        let last = Arc::new(AtomicUsize::new(0));
        scheduler.spawn(counting_task(&last, 1));
        scheduler.spawn(counting_task(&last, 2));
        assert_eq!(scheduler.pending(), 2);

        assert!(scheduler.run_last().await);
        assert_eq!(last.load(Ordering::SeqCst), 2);
        assert!(scheduler.run_next().await);
        assert_eq!(last.load(Ordering::SeqCst), 1);
        assert!(!scheduler.run_next().await);
    }

    #[tokio::test]
    async fn test_take_removes_without_running() {
        let scheduler = ManualScheduler::new();
        let last = Arc::new(AtomicUsize::new(0));
        scheduler.spawn(counting_task(&last, 7));
        let task = scheduler.take(0).expect("queued");
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(last.load(Ordering::SeqCst), 0);
        task.await;
        assert_eq!(last.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_tokio_scheduler_runs_tasks() {
        let scheduler = TokioScheduler::try_current().expect("inside runtime");
        let (tx, rx) = tokio::sync::oneshot::channel();
        scheduler.spawn(Box::pin(async move {
            let _ = tx.send(42);
        }));
        assert_eq!(rx.await.ok(), Some(42));
    }

    #[tokio::test]
    async fn test_run_blocking_returns_result() {
        let tokio = TokioScheduler::try_current().expect("inside runtime");
        assert_eq!(run_blocking(&tokio, || 6 * 7).await, Some(42));

        let manual = ManualScheduler::new();
        assert_eq!(run_blocking(&manual, || "inline").await, Some("inline"));
    }

    #[tokio::test]
    async fn test_run_blocking_reports_panic_as_none() {
        let tokio = TokioScheduler::try_current().expect("inside runtime");
        let result: Option<u8> = run_blocking(&tokio, || panic!("job failed")).await;
        assert_eq!(result, None);
    }

    #[test]
    fn test_manual_scheduler_needs_no_runtime() {
        let scheduler = ManualScheduler::new();
        let last = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&last);
        let blocking = scheduler.spawn_blocking(Box::new(move || {
            counter.store(3, Ordering::SeqCst);
        }));
        scheduler.spawn(blocking);
        assert_eq!(futures::executor::block_on(scheduler.run_all()), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_tokio_scheduler_outside_runtime() {
        assert!(matches!(
            TokioScheduler::try_current(),
            Err(SessionError::NoRuntime(_))
        ));
    }
}
