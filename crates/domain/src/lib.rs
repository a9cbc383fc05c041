//! # PetClinic Domain
//!
//! Business domain types for the PetClinic performance samples.
//!
//! This crate contains:
//! - Clinic entities (owners, pets, visits)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other PetClinic crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
