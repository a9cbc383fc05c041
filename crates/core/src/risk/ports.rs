//! Port interfaces for disease-risk recommendations

use async_trait::async_trait;
use petclinic_domain::{Pet, PetId, Result};
use tokio_util::sync::CancellationToken;

use super::RiskState;

/// Lookup of a single pet by identifier
#[async_trait]
pub trait PetLookup: Send + Sync {
    /// Find a pet, failing with `ClinicError::NotFound` if it does not exist
    async fn find_pet(&self, id: PetId) -> Result<Pet>;
}

/// The (expensive) disease-risk model behind the recommendations
#[async_trait]
pub trait RiskModel: Send + Sync {
    /// Recalculate the risks based on the current state
    ///
    /// Runs while every recommendation lookup is blocked. Implementations
    /// must return `ClinicError::Interrupted` promptly once `cancel` fires.
    async fn recalculate(&self, current: &RiskState, cancel: &CancellationToken) -> Result<()>;
}
