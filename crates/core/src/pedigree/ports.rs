//! Port interfaces for pedigree tracking

use async_trait::async_trait;
use petclinic_domain::Result;

/// Pet name persistence used by pedigree updates
#[async_trait]
pub trait PetNameStore: Send + Sync {
    /// Current name of the first pet whose name starts with `prefix`
    ///
    /// Returns `ClinicError::NotFound` when no pet matches.
    async fn find_name_with_prefix(&self, prefix: &str) -> Result<String>;

    /// Rename every pet called `current` to `new`, returning the number renamed
    async fn rename(&self, current: &str, new: &str) -> Result<usize>;
}
