//! Application context - dependency injection container

use std::sync::Arc;

use petclinic_common::pool::{WorkerPool, WorkerPoolConfig};
use petclinic_core::{CareTipsService, DiseaseRiskService, PedigreeService};
use petclinic_domain::{Config, Result};
use petclinic_infra::scheduling::SchedulerError;
use petclinic_infra::{
    InMemoryClinicRepository, RecomputeScheduler, RecomputeSchedulerConfig, SimulatedCareAdvisor,
    SimulatedRiskModel, TracingReportSink,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Application context - holds all services and their schedulers
pub struct AppContext {
    pub config: Config,
    pub repository: Arc<InMemoryClinicRepository>,
    pub pool: WorkerPool,
    pub risk: Arc<DiseaseRiskService>,
    pub care: Arc<CareTipsService>,
    pub pedigree: Option<Arc<PedigreeService>>,
    schedulers: Vec<RecomputeScheduler>,
    shutdown: CancellationToken,
}

impl AppContext {
    /// Build every service from `config`; nothing is started yet
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::Config` if the pool settings are invalid.
    pub fn new(config: Config) -> Result<Self> {
        let repository = Arc::new(InMemoryClinicRepository::with_sample_data());
        tracing::info!(pets = repository.pet_count(), "Clinic repository seeded");
        let shutdown = CancellationToken::new();
        let pool = WorkerPool::new(WorkerPoolConfig::from_settings(&config.pool)?);

        let risk = Arc::new(
            DiseaseRiskService::new(
                repository.clone(),
                Arc::new(SimulatedRiskModel::new(config.risk.recalculation())),
            )
            .with_compose_delay(config.risk.compose_delay())
            .with_cancellation(shutdown.child_token()),
        );

        let care = Arc::new(CareTipsService::new(
            repository.clone(),
            Arc::new(SimulatedCareAdvisor::new(config.care.advice_delay())),
            pool.clone(),
            Arc::new(TracingReportSink),
        ));

        let pedigree = config.pedigree.enabled.then(|| Arc::new(PedigreeService::new(repository.clone())));

        let mut schedulers = Vec::new();
        if config.risk.enabled {
            schedulers.push(RecomputeScheduler::new(
                "risk",
                risk.clone(),
                RecomputeSchedulerConfig {
                    interval: config.risk.recompute_interval(),
                    initial_delay: config.risk.initial_delay(),
                    ..Default::default()
                },
            ));
        }
        if let Some(pedigree) = &pedigree {
            schedulers.push(RecomputeScheduler::new(
                "pedigree",
                pedigree.clone(),
                RecomputeSchedulerConfig {
                    interval: config.pedigree.update_interval(),
                    ..Default::default()
                },
            ));
        }

        Ok(Self { config, repository, pool, risk, care, pedigree, schedulers, shutdown })
    }

    /// Start every configured scheduler
    ///
    /// # Errors
    ///
    /// Fails if a scheduler is already running.
    pub async fn start(&mut self) -> Result<()> {
        for scheduler in &mut self.schedulers {
            scheduler.start().await?;
        }
        tracing::info!(schedulers = self.schedulers.len(), "Schedulers started");
        Ok(())
    }

    /// Build and publish the care tips report in the background, if enabled
    pub fn spawn_care_report(&self) -> Option<JoinHandle<Result<String>>> {
        if !self.config.care.enabled {
            return None;
        }
        let care = Arc::clone(&self.care);
        Some(tokio::spawn(async move { care.compose_care_tips().await }))
    }

    /// Whether any scheduler is still running
    pub fn is_running(&self) -> bool {
        self.schedulers.iter().any(RecomputeScheduler::is_running)
    }

    /// Interrupt in-flight work, stop schedulers and drain the pool
    pub async fn shutdown(&mut self) {
        self.shutdown.cancel();

        for scheduler in &mut self.schedulers {
            match scheduler.stop().await {
                Ok(()) | Err(SchedulerError::NotRunning) => {}
                Err(e) => tracing::warn!(error = %e, "Scheduler did not stop cleanly"),
            }
        }

        self.pool.shutdown_now().await;
        tracing::info!(pool = %self.pool.metrics().status_message(), "Application context shut down");
    }
}
