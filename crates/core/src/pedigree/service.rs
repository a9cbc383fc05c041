//! Pedigree service

use std::collections::HashMap;
use std::sync::Arc;

use petclinic_domain::constants::{PEDIGREE_BETA_TEST_PET, PEDIGREE_NEW_TITLE};
use petclinic_domain::{ClinicError, PetId, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace};

use super::ports::PetNameStore;

/// Keeps pedigree texts in sync with the beta-test pet's name
///
/// Both update paths take the text cache lock before touching the store, so
/// a manual and a scheduled update never wait on each other in opposite
/// order.
pub struct PedigreeService {
    store: Arc<dyn PetNameStore>,
    texts: Mutex<HashMap<PetId, String>>,
}

impl PedigreeService {
    pub fn new(store: Arc<dyn PetNameStore>) -> Self {
        Self { store, texts: Mutex::new(HashMap::new()) }
    }

    /// Whether the named pet takes part in pedigree beta testing
    pub fn is_pet_in_beta_testing(&self, name: &str) -> bool {
        name.contains(PEDIGREE_BETA_TEST_PET)
    }

    /// The raw name for a titled one and vice versa
    pub fn toggled_name(current: &str) -> String {
        if current == PEDIGREE_BETA_TEST_PET {
            format!("{PEDIGREE_BETA_TEST_PET}{PEDIGREE_NEW_TITLE}")
        } else {
            PEDIGREE_BETA_TEST_PET.to_string()
        }
    }

    /// Store the pedigree text of a pet
    pub async fn record_pedigree(&self, pet_id: PetId, text: impl Into<String>) {
        self.texts.lock().await.insert(pet_id, text.into());
    }

    /// Pedigree text of a pet, if recorded
    pub async fn pedigree_text(&self, pet_id: PetId) -> Option<String> {
        self.texts.lock().await.get(&pet_id).cloned()
    }

    /// Update the pedigree of the named pet on request
    ///
    /// Returns the pet's new name.
    ///
    /// # Errors
    ///
    /// - `ClinicError::InvalidInput` if the pet is not in beta testing
    /// - the store's failure otherwise; cached texts are left untouched then
    #[instrument(skip(self))]
    pub async fn update_by_request(&self, current_name: &str) -> Result<String> {
        if !self.is_pet_in_beta_testing(current_name) {
            return Err(ClinicError::InvalidInput(format!(
                "pet '{current_name}' is not in pedigree beta testing"
            )));
        }
        debug!(pet = current_name, "Manually updating pedigree...");

        let mut texts = self.texts.lock().await;
        let new_name = Self::toggled_name(current_name);
        self.store.rename(current_name, &new_name).await?;
        rewrite_name_entries(&mut texts, current_name, &new_name);

        info!(pet = %new_name, former = current_name, "Manual pedigree update is done");
        Ok(new_name)
    }

    /// Scheduled pedigree update of the beta-test pet
    ///
    /// Returns the pet's new name.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::NotFound` if no pet is in beta testing, or the
    /// store's failure.
    #[instrument(skip(self))]
    pub async fn update_by_schedule(&self) -> Result<String> {
        debug!(pet = PEDIGREE_BETA_TEST_PET, "Auto updating pedigree...");

        let mut texts = self.texts.lock().await;
        let current_name = self.store.find_name_with_prefix(PEDIGREE_BETA_TEST_PET).await?;
        let new_name = Self::toggled_name(&current_name);
        let renamed = self.store.rename(&current_name, &new_name).await?;
        trace!(renamed, "Store records updated");
        rewrite_name_entries(&mut texts, &current_name, &new_name);

        info!(from = %current_name, to = %new_name, "Pet name changed");
        Ok(new_name)
    }
}

/// Replace `current` with `new` in every text that mentions it
fn rewrite_name_entries(texts: &mut HashMap<PetId, String>, current: &str, new: &str) {
    texts
        .values_mut()
        .filter(|text| text.contains(current))
        .for_each(|text| *text = text.replace(current, new));
}
