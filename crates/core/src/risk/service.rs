//! Disease-risk service - visit recommendations over a gated cache

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use petclinic_common::cache::{CacheStats, GatedCache};
use petclinic_domain::constants::{RECOMMENDED_VISIT_DESCRIPTION, RECOMMENDED_VISIT_LEAD_WEEKS};
use petclinic_domain::{ClinicError, PetId, Result, Visit};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::ports::{PetLookup, RiskModel};

/// State of the risk model that recommendations are derived from
///
/// The generation is bumped by every successful recalculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskState {
    pub generation: u64,
}

/// Recommended visits per pet, cached until the next risk recalculation
///
/// Any number of lookups may compose recommendations at once, but none runs
/// while [`recalculate_disease_risks`](Self::recalculate_disease_risks) is in
/// progress, and every recommendation composed before a recalculation is
/// discarded by it.
pub struct DiseaseRiskService {
    pets: Arc<dyn PetLookup>,
    model: Arc<dyn RiskModel>,
    visits: GatedCache<PetId, Arc<Vec<Visit>>, RiskState>,
    compose_delay: Duration,
    cancellation: CancellationToken,
}

impl DiseaseRiskService {
    /// Create a new disease-risk service
    pub fn new(pets: Arc<dyn PetLookup>, model: Arc<dyn RiskModel>) -> Self {
        Self {
            pets,
            model,
            visits: GatedCache::new(RiskState::default()),
            compose_delay: Duration::ZERO,
            cancellation: CancellationToken::new(),
        }
    }

    /// Simulated cost of composing recommendations for one pet
    pub fn with_compose_delay(mut self, delay: Duration) -> Self {
        self.compose_delay = delay;
        self
    }

    /// Use an externally owned token to interrupt recalculations
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Recommended visits for the given pet
    ///
    /// Served from the cache when present; otherwise composed (waiting for
    /// any in-progress recalculation first) and cached.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::NotFound` if the pet does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_recommended_visits(&self, pet_id: PetId) -> Result<Arc<Vec<Visit>>> {
        self.visits.get_or_compute(pet_id, |state| self.recommend_visits(pet_id, state)).await
    }

    async fn recommend_visits(&self, pet_id: PetId, state: RiskState) -> Result<Arc<Vec<Visit>>> {
        debug!(pet_id, generation = state.generation, "Composing visit recommendations...");

        let pet = self.pets.find_pet(pet_id).await?;
        if !self.compose_delay.is_zero() {
            tokio::time::sleep(self.compose_delay).await;
        }

        let visit = Visit {
            id: rand::thread_rng().gen_range(1..i32::MAX),
            pet_id,
            pet_name: pet.name.clone(),
            date: Local::now().date_naive() + chrono::Duration::weeks(RECOMMENDED_VISIT_LEAD_WEEKS),
            description: RECOMMENDED_VISIT_DESCRIPTION.to_string(),
        };

        info!(pet = %pet.name, pet_id, "Visit recommendation list composed");
        Ok(Arc::new(vec![visit]))
    }

    /// Recalculate disease risks and drop every cached recommendation
    ///
    /// Holds the exclusive side of the gate for the whole recalculation. The
    /// cache ends up empty on every exit path, so a failed run forces fresh
    /// recommendations rather than leaving stale ones.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::Interrupted` if the recalculation was cancelled,
    /// or the model's own failure otherwise. Nothing is retried.
    pub async fn recalculate_disease_risks(&self) -> Result<()> {
        let cancel = self.cancellation.clone();
        self.recalculate_disease_risks_until(&cancel).await
    }

    /// Like [`recalculate_disease_risks`](Self::recalculate_disease_risks),
    /// but also interrupted when `stop` fires
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::Interrupted` if either token fires first.
    #[instrument(skip_all)]
    pub async fn recalculate_disease_risks_until(&self, stop: &CancellationToken) -> Result<()> {
        debug!("Recalculating diseases risks...");
        let hit_rate = self.visits.stats().hit_rate();

        let model = Arc::clone(&self.model);
        let cancel = self.cancellation.clone();
        let stop = stop.clone();
        self.visits
            .recompute(|state| async move {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => {
                        return Err(ClinicError::Interrupted("risk recalculation stopped".to_string()));
                    }
                    outcome = model.recalculate(&state, &cancel) => outcome?,
                }
                Ok::<_, ClinicError>(RiskState { generation: state.generation + 1 })
            })
            .await?;

        info!(hit_rate, "Risks of diseases recalculated");
        Ok(())
    }

    /// Current risk state (waits for an in-progress recalculation)
    pub async fn risk_state(&self) -> RiskState {
        self.visits.state().await
    }

    /// Token that interrupts recalculations when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Number of pets with cached recommendations
    pub fn cached_pets(&self) -> usize {
        self.visits.len()
    }

    /// Recommendation cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.visits.stats()
    }
}
