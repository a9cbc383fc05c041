//! # PetClinic Core
//!
//! Business logic of the performance samples - no infrastructure code.
//!
//! This crate contains:
//! - Port interfaces (traits) for entity lookup, reporting and the
//!   simulated computations
//! - [`DiseaseRiskService`]: visit recommendations cached per pet and
//!   invalidated by a periodic risk recalculation
//! - [`CareTipsService`]: a two-level fan-out (owners, then their pets) over
//!   the shared worker pool, joined into one report
//! - [`PedigreeService`]: pet name titles kept in sync with cached texts
//!
//! ## Architecture Principles
//! - Depends only on `petclinic-common` and `petclinic-domain`
//! - All collaborators are injected as `Arc<dyn Port>`
//! - Timers and triggers live in the infrastructure layer

pub mod care;
pub mod pedigree;
pub mod risk;

// Re-export specific items to avoid ambiguity
pub use care::ports::{CareAdvisor, OwnerLookup, ReportSink};
pub use care::{CareTipsService, OwnerCareTask, PetCareTask};
pub use pedigree::ports::PetNameStore;
pub use pedigree::PedigreeService;
pub use risk::ports::{PetLookup, RiskModel};
pub use risk::{DiseaseRiskService, RiskState};
