//! Worker pool implementation

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use super::config::WorkerPoolConfig;
use super::error::{PoolError, PoolResult};

tokio::task_local! {
    /// Set while a coordinator started by this module is running
    static COORDINATOR: ();
}

fn in_coordinator() -> bool {
    COORDINATOR.try_with(|_| ()).is_ok()
}

/// Metrics for worker pool monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Configured worker slots
    pub workers: usize,
    /// Total number of tasks accepted
    pub submitted: u64,
    /// Total number of tasks that ran to completion
    pub completed: u64,
    /// Total number of submissions refused
    pub rejected: u64,
    /// Tasks currently holding a worker slot
    pub active: usize,
    /// Tasks accepted but still waiting for a slot
    pub queued: usize,
}

impl PoolMetrics {
    /// Get a human-readable status message
    pub fn status_message(&self) -> String {
        format!(
            "Worker pool: {}/{} active, {} queued, {} completed, {} rejected",
            self.active, self.workers, self.queued, self.completed, self.rejected
        )
    }
}

#[derive(Debug, Default)]
struct PoolCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    rejected: AtomicU64,
    active: AtomicUsize,
    queued: AtomicUsize,
}

/// Decrements a gauge when dropped, including when the task is aborted
struct GaugeGuard {
    counters: Arc<PoolCounters>,
    gauge: fn(&PoolCounters) -> &AtomicUsize,
}

impl GaugeGuard {
    fn enter(counters: &Arc<PoolCounters>, gauge: fn(&PoolCounters) -> &AtomicUsize) -> Self {
        gauge(counters).fetch_add(1, Ordering::Relaxed);
        Self { counters: Arc::clone(counters), gauge }
    }
}

fn queued_gauge(counters: &PoolCounters) -> &AtomicUsize {
    &counters.queued
}

fn active_gauge(counters: &PoolCounters) -> &AtomicUsize {
    &counters.active
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        (self.gauge)(&self.counters).fetch_sub(1, Ordering::Relaxed);
    }
}

/// Handle to a task submitted to the pool
///
/// Dropping the handle detaches the task; it keeps running until it finishes
/// or the pool is shut down.
#[must_use = "a submitted task's result is lost unless it is joined"]
pub struct TaskHandle<T> {
    inner: JoinHandle<PoolResult<T>>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task and return its output
    ///
    /// # Errors
    ///
    /// - [`PoolError::ShutDown`] if the pool was shut down before the task
    ///   got a worker slot
    /// - [`PoolError::TaskFailed`] if the task panicked or was aborted
    pub async fn join(self) -> PoolResult<T> {
        match self.inner.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => Err(PoolError::TaskFailed("task panicked".to_string())),
            Err(_) => Err(PoolError::TaskFailed("task was aborted".to_string())),
        }
    }

    /// Abort the task
    pub fn abort(&self) {
        self.inner.abort();
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").field("finished", &self.inner.is_finished()).finish()
    }
}

/// Wait for every handle and return their outputs in submission order
///
/// All handles are awaited even when an earlier one failed, so no task is
/// left running unobserved; the first failure in submission order is then
/// returned.
///
/// # Errors
///
/// Returns the first [`PoolError`] in submission order.
pub async fn join_all<T>(handles: Vec<TaskHandle<T>>) -> PoolResult<Vec<T>> {
    futures::future::join_all(handles.into_iter().map(TaskHandle::join))
        .await
        .into_iter()
        .collect()
}

/// Bounded pool of worker slots shared by all fan-out computations
///
/// Clones are handles to the same pool.
#[derive(Clone)]
pub struct WorkerPool {
    config: WorkerPoolConfig,
    slots: Arc<Semaphore>,
    admission: Option<Arc<Semaphore>>,
    tracker: TaskTracker,
    cancellation: CancellationToken,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// Create a new pool with the given configuration
    pub fn new(config: WorkerPoolConfig) -> Self {
        info!(workers = config.workers, max_queue = ?config.max_queue, "Creating worker pool");
        Self {
            slots: Arc::new(Semaphore::new(config.workers)),
            admission: config.capacity().map(|capacity| Arc::new(Semaphore::new(capacity))),
            tracker: TaskTracker::new(),
            cancellation: CancellationToken::new(),
            counters: Arc::new(PoolCounters::default()),
            config,
        }
    }

    /// Submit a task that occupies a worker slot while it runs
    ///
    /// The task starts once a slot is free. Must be called from within a
    /// tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ShutDown`] if the pool is shutting down. A coordinator
    ///   accepted before [`shutdown`](Self::shutdown) may still submit its
    ///   children until [`shutdown_now`](Self::shutdown_now).
    /// - [`PoolError::Exhausted`] if the admission limit is reached
    pub fn submit<F, T>(&self, task: F) -> PoolResult<TaskHandle<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.ensure_accepting(in_coordinator())?;
        let admission = self.admit()?;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);

        let slots = Arc::clone(&self.slots);
        let counters = Arc::clone(&self.counters);
        let queued = GaugeGuard::enter(&self.counters, queued_gauge);

        let inner = self.tracker.spawn(async move {
            let _admission = admission;
            let slot = slots.acquire_owned().await.map_err(|_| PoolError::ShutDown);
            drop(queued);
            let _slot = slot?;

            let _active = GaugeGuard::enter(&counters, active_gauge);
            let output = task.await;
            counters.completed.fetch_add(1, Ordering::Relaxed);
            Ok::<T, PoolError>(output)
        });

        Ok(TaskHandle { inner })
    }

    /// Start a task that coordinates other pool tasks
    ///
    /// Coordinators are tracked for shutdown like any other task but hold no
    /// worker slot and are not subject to admission, so they may block on
    /// children submitted to this same pool without starving them. Children
    /// submitted from inside the coordinator are accepted during a graceful
    /// [`shutdown`](Self::shutdown), which waits for them.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] if the pool is shutting down.
    pub fn spawn_coordinator<F, T>(&self, task: F) -> PoolResult<TaskHandle<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.ensure_accepting(false)?;
        let inner = self
            .tracker
            .spawn(COORDINATOR.scope((), async move { Ok::<T, PoolError>(task.await) }));
        Ok(TaskHandle { inner })
    }

    /// Submit every task, then wait for all of them
    ///
    /// If any submission is refused, the tasks already submitted are aborted
    /// and the refusal is returned.
    ///
    /// # Errors
    ///
    /// Returns the submission error, or the first task failure in order.
    #[instrument(skip(self, tasks), fields(workers = self.config.workers))]
    pub async fn invoke_all<I, F, T>(&self, tasks: I) -> PoolResult<Vec<T>>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles = Vec::new();
        for task in tasks {
            match self.submit(task) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    warn!(error = %err, submitted = handles.len(), "Submission refused; aborting batch");
                    handles.iter().for_each(TaskHandle::abort);
                    return Err(err);
                }
            }
        }
        join_all(handles).await
    }

    /// Token cancelled by [`shutdown_now`](Self::shutdown_now)
    ///
    /// Long-running tasks should select on it to stop cooperatively.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Whether the pool still accepts tasks
    pub fn is_open(&self) -> bool {
        !self.tracker.is_closed()
    }

    /// Stop accepting tasks and wait for every accepted task to finish
    ///
    /// Accepted coordinators keep submitting their children, so their
    /// fan-outs complete.
    pub async fn shutdown(&self) {
        info!("Shutting down worker pool");
        self.tracker.close();
        self.tracker.wait().await;
        debug!(status = %self.metrics().status_message(), "Worker pool drained");
    }

    /// Stop accepting tasks, cancel running ones and wait for them to exit
    ///
    /// Tasks still waiting for a slot fail with [`PoolError::ShutDown`].
    pub async fn shutdown_now(&self) {
        warn!("Cancelling worker pool tasks");
        self.tracker.close();
        self.cancellation.cancel();
        self.slots.close();
        self.tracker.wait().await;
        debug!(status = %self.metrics().status_message(), "Worker pool cancelled");
    }

    /// Get pool metrics
    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            workers: self.config.workers,
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            active: self.counters.active.load(Ordering::Relaxed),
            queued: self.counters.queued.load(Ordering::Relaxed),
        }
    }

    /// Pool configuration
    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    fn ensure_accepting(&self, from_coordinator: bool) -> PoolResult<()> {
        let closed = self.tracker.is_closed() && !from_coordinator;
        if closed || self.cancellation.is_cancelled() {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(PoolError::ShutDown);
        }
        Ok(())
    }

    fn admit(&self) -> PoolResult<Option<OwnedSemaphorePermit>> {
        let Some(admission) = &self.admission else {
            return Ok(None);
        };
        Arc::clone(admission).try_acquire_owned().map(Some).map_err(|_| {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            let capacity = self.config.capacity().unwrap_or(self.config.workers);
            debug!(capacity, "Worker pool rejected task");
            PoolError::Exhausted { capacity }
        })
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.config.workers)
            .field("max_queue", &self.config.max_queue)
            .field("open", &self.is_open())
            .finish()
    }
}
