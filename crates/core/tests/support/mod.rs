//! Shared test helpers for `petclinic-core` integration tests.
//!
//! In-memory ports with configurable delays so the concurrency tests can
//! reason about timing without real infrastructure.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use petclinic_core::{CareAdvisor, OwnerLookup, PetLookup, ReportSink, RiskModel, RiskState};
use petclinic_domain::{ClinicError, Owner, Pet, PetId, PetKind, Result};
use tokio_util::sync::CancellationToken;

/// Fixed set of owners, looked up by pet id as well.
#[derive(Clone, Default)]
pub struct MockClinic {
    owners: Vec<Owner>,
}

impl MockClinic {
    pub fn new(owners: Vec<Owner>) -> Self {
        Self { owners }
    }

    /// Two owners with three pets between them.
    pub fn sample() -> Self {
        Self::new(vec![
            Owner::new(1, "George", "Franklin")
                .with_pet(Pet::new(1, "Leo", PetKind::Cat))
                .with_pet(Pet::new(2, "Basil", PetKind::Hamster)),
            Owner::new(2, "Betty", "Davis").with_pet(Pet::new(3, "Rosy", PetKind::Dog)),
        ])
    }
}

#[async_trait]
impl PetLookup for MockClinic {
    async fn find_pet(&self, id: PetId) -> Result<Pet> {
        self.owners
            .iter()
            .flat_map(|owner| owner.pets.iter())
            .find(|pet| pet.id == id)
            .cloned()
            .ok_or_else(|| ClinicError::NotFound(format!("pet {id}")))
    }
}

#[async_trait]
impl OwnerLookup for MockClinic {
    async fn all_owners(&self) -> Result<Vec<Owner>> {
        Ok(self.owners.clone())
    }
}

/// Risk model that sleeps for a fixed time, honouring cancellation.
#[derive(Default)]
pub struct SlowRiskModel {
    pub duration: Duration,
    pub runs: AtomicUsize,
}

impl SlowRiskModel {
    pub fn taking(duration: Duration) -> Arc<Self> {
        Arc::new(Self { duration, runs: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl RiskModel for SlowRiskModel {
    async fn recalculate(&self, _current: &RiskState, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            _ = tokio::time::sleep(self.duration) => {
                self.runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            _ = cancel.cancelled() => Err(ClinicError::Interrupted("risk recalculation".into())),
        }
    }
}

/// Advisor that sleeps, then proposes more sleep. Fails for one pet if asked.
#[derive(Default)]
pub struct SleepyAdvisor {
    pub delay: Duration,
    pub failing_pet: Option<String>,
    pub calls: AtomicUsize,
}

impl SleepyAdvisor {
    pub fn taking(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay, ..Self::default() })
    }

    pub fn failing_for(pet: &str) -> Arc<Self> {
        Arc::new(Self { failing_pet: Some(pet.to_string()), ..Self::default() })
    }
}

#[async_trait]
impl CareAdvisor for SleepyAdvisor {
    async fn advise(&self, pet: &Pet, cancel: &CancellationToken) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {}
            _ = cancel.cancelled() => return Err(ClinicError::Interrupted("care advice".into())),
        }
        if self.failing_pet.as_deref() == Some(pet.name.as_str()) {
            return Err(ClinicError::Internal(format!("advisor unavailable for {}", pet.name)));
        }
        Ok("should sleep more".to_string())
    }
}

/// Sink that remembers every published report.
#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

impl ReportSink for RecordingSink {
    fn publish(&self, text: &str) {
        self.reports.lock().unwrap().push(text.to_string());
    }
}
