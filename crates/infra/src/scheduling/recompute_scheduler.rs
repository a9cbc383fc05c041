//! Fixed-delay scheduler for recompute jobs
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use petclinic_core::DiseaseRiskService;
//! use petclinic_infra::scheduling::{RecomputeScheduler, RecomputeSchedulerConfig};
//!
//! # async fn example(service: Arc<DiseaseRiskService>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut scheduler = RecomputeScheduler::new(
//!     "risk",
//!     service,
//!     RecomputeSchedulerConfig { interval: Duration::from_secs(5), ..Default::default() },
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use petclinic_core::{DiseaseRiskService, PedigreeService};
use petclinic_domain::Result;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// A unit of periodic work
#[async_trait]
pub trait RecomputeJob: Send + Sync {
    /// Execute the job once.
    ///
    /// `cancel` fires when the scheduler is stopped; long jobs should return
    /// `ClinicError::Interrupted` promptly then. Returning `Interrupted`
    /// stops the schedule.
    async fn run(&self, cancel: &CancellationToken) -> Result<()>;
}

#[async_trait]
impl RecomputeJob for DiseaseRiskService {
    async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        self.recalculate_disease_risks_until(cancel).await
    }
}

/// Pedigree updates are short and always run to completion, so the store
/// and the cached texts never disagree.
#[async_trait]
impl RecomputeJob for PedigreeService {
    async fn run(&self, _cancel: &CancellationToken) -> Result<()> {
        self.update_by_schedule().await.map(|_| ())
    }
}

/// Type alias for task handle to avoid complexity warnings
type LoopHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the recompute scheduler
#[derive(Debug, Clone)]
pub struct RecomputeSchedulerConfig {
    /// Delay between the end of one run and the start of the next
    pub interval: Duration,
    /// Delay before the first run
    pub initial_delay: Duration,
    /// How long [`RecomputeScheduler::stop`] waits for the loop to finish
    pub join_timeout: Duration,
}

impl Default for RecomputeSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            initial_delay: Duration::ZERO,
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Runs a [`RecomputeJob`] repeatedly until stopped
pub struct RecomputeScheduler {
    name: &'static str,
    job: Arc<dyn RecomputeJob>,
    config: RecomputeSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: LoopHandle,
}

impl RecomputeScheduler {
    /// Create a new scheduler; `name` labels its log events
    pub fn new(name: &'static str, job: Arc<dyn RecomputeJob>, config: RecomputeSchedulerConfig) -> Self {
        Self {
            name,
            job,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scheduler
    ///
    /// Spawns a background task that runs the job periodically.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self), fields(scheduler = self.name))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        // Fresh token so the scheduler can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        let name = self.name;
        let job = Arc::clone(&self.job);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::run_loop(name, job, config, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!(interval = ?self.config.interval, "Recompute scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the loop and awaits its completion. A run in progress sees
    /// the cancellation through the token passed to the job.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running, or the loop does not finish
    /// within the join timeout.
    #[instrument(skip(self), fields(scheduler = self.name))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let handle = self.task_handle.lock().await.take();
        let Some(handle) = handle.filter(|h| !h.is_finished()) else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation_token.cancel();

        let join_timeout = self.config.join_timeout;
        tokio::time::timeout(join_timeout, handle)
            .await
            .map_err(|_| SchedulerError::Timeout { duration: join_timeout })??;

        info!("Recompute scheduler stopped");
        Ok(())
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn run_loop(
        name: &'static str,
        job: Arc<dyn RecomputeJob>,
        config: RecomputeSchedulerConfig,
        cancel: CancellationToken,
    ) {
        let mut delay = config.initial_delay;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(scheduler = name, "Recompute loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    let started = Instant::now();
                    match job.run(&cancel).await {
                        Ok(()) => debug!(scheduler = name, elapsed = ?started.elapsed(), "Recompute run finished"),
                        Err(e) if cancel.is_cancelled() => {
                            debug!(scheduler = name, error = %e, "Recompute run stopped by scheduler");
                            break;
                        }
                        Err(e) if e.is_interrupted() => {
                            warn!(scheduler = name, error = %e, "Recompute interrupted; stopping schedule");
                            break;
                        }
                        Err(e) => error!(scheduler = name, error = %e, "Recompute run failed"),
                    }
                    delay = config.interval;
                }
            }
        }
    }
}
