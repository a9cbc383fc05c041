//! Simulated computations
//!
//! Stand-ins for the expensive risk model and care advisor. Both take a
//! configurable amount of time and stop early when cancelled.

use std::time::Duration;

use async_trait::async_trait;
use petclinic_core::{CareAdvisor, RiskModel, RiskState};
use petclinic_domain::{ClinicError, Pet, Result};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Sleep for `duration` unless `cancel` fires first
async fn work_for(duration: Duration, cancel: &CancellationToken, what: &str) -> Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ClinicError::Interrupted(format!("{what} cancelled"))),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Risk model whose recalculation just takes time
#[derive(Debug, Clone)]
pub struct SimulatedRiskModel {
    duration: Duration,
}

impl SimulatedRiskModel {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl RiskModel for SimulatedRiskModel {
    async fn recalculate(&self, current: &RiskState, cancel: &CancellationToken) -> Result<()> {
        trace!(generation = current.generation, duration = ?self.duration, "Simulating risk recalculation");
        work_for(self.duration, cancel, "risk recalculation").await
    }
}

/// Advisor that always recommends more sleep, after thinking about it
#[derive(Debug, Clone)]
pub struct SimulatedCareAdvisor {
    delay: Duration,
}

impl SimulatedCareAdvisor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CareAdvisor for SimulatedCareAdvisor {
    async fn advise(&self, _pet: &Pet, cancel: &CancellationToken) -> Result<String> {
        work_for(self.delay, cancel, "care advice").await?;
        Ok("should sleep more".to_string())
    }
}
