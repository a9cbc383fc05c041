//! Owner and pet care tasks

use std::sync::Arc;

use petclinic_common::pool::WorkerPool;
use petclinic_domain::constants::CARE_TIP_SEPARATOR;
use petclinic_domain::{ClinicError, Owner, Pet, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::ports::CareAdvisor;

/// Composes the tip for a single pet; consumed by [`call`](Self::call)
pub struct PetCareTask {
    pet: Pet,
    advisor: Arc<dyn CareAdvisor>,
    cancel: CancellationToken,
}

impl PetCareTask {
    pub fn new(pet: Pet, advisor: Arc<dyn CareAdvisor>, cancel: CancellationToken) -> Self {
        Self { pet, advisor, cancel }
    }

    /// Run the per-pet computation and phrase its advice as a tip
    ///
    /// # Errors
    ///
    /// Propagates the advisor's failure unchanged.
    pub async fn call(self) -> Result<String> {
        trace!(pet = %self.pet.name, "Composing care tip...");

        let advice = self.advisor.advise(&self.pet, &self.cancel).await?;

        info!(pet = %self.pet.name, "Care tip proposed");
        Ok(format!("Your '{}' {}", self.pet.name, advice))
    }
}

/// Collects the tips for all pets of one owner; consumed by [`call`](Self::call)
pub struct OwnerCareTask {
    owner: Owner,
    pool: WorkerPool,
    advisor: Arc<dyn CareAdvisor>,
}

impl OwnerCareTask {
    pub fn new(owner: Owner, pool: WorkerPool, advisor: Arc<dyn CareAdvisor>) -> Self {
        Self { owner, pool, advisor }
    }

    /// Submit one [`PetCareTask`] per pet to the pool and join their tips
    ///
    /// Waits for every pet task before returning. Tips keep the order of the
    /// owner's pets.
    ///
    /// # Errors
    ///
    /// Fails if any pet task fails or cannot be submitted; no partial text is
    /// produced. Interruptions and pool exhaustion are passed through as is,
    /// anything else is wrapped with the owner's name.
    pub async fn call(self) -> Result<String> {
        let Self { owner, pool, advisor } = self;
        let cancel = pool.cancellation_token();

        let tasks: Vec<_> = owner
            .pets
            .into_iter()
            .map(|pet| PetCareTask::new(pet, Arc::clone(&advisor), cancel.clone()))
            .collect();

        debug!(pets = tasks.len(), owner = %owner.first_name, "Proposing care tips for owner's pets...");

        let outcome = match pool.invoke_all(tasks.into_iter().map(PetCareTask::call)).await {
            Ok(results) => results.into_iter().collect::<Result<Vec<_>>>(),
            Err(err) => Err(err.into()),
        };
        let tips = outcome.map_err(|err| owner_failure(&owner.first_name, err))?;

        Ok(format!(
            "Dear {}, here is your pet care tip(s):{CARE_TIP_SEPARATOR}{}",
            owner.first_name,
            tips.join(CARE_TIP_SEPARATOR)
        ))
    }
}

fn owner_failure(first_name: &str, err: ClinicError) -> ClinicError {
    match err {
        ClinicError::Interrupted(_) | ClinicError::PoolExhausted(_) => err,
        other => ClinicError::Task(format!("care tips for {first_name} failed: {other}")),
    }
}
