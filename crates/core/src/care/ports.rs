//! Port interfaces for care tips

use async_trait::async_trait;
use petclinic_domain::{Owner, Pet, Result};
use tokio_util::sync::CancellationToken;

/// Bulk listing of owners together with their pets
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    /// List every owner
    async fn all_owners(&self) -> Result<Vec<Owner>>;
}

/// The per-pet tip computation
#[async_trait]
pub trait CareAdvisor: Send + Sync {
    /// Advice for one pet, phrased to follow the pet's name
    /// (for example `"should sleep more"`)
    ///
    /// Must return `ClinicError::Interrupted` once `cancel` fires.
    async fn advise(&self, pet: &Pet, cancel: &CancellationToken) -> Result<String>;
}

/// Destination for human-readable reports (fire-and-forget)
pub trait ReportSink: Send + Sync {
    fn publish(&self, text: &str);
}
