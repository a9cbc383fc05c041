//! # PetClinic Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (files and environment)
//! - An in-memory clinic repository seeded with sample owners and pets
//! - Simulated risk model and care advisor with configurable latency
//! - The fixed-delay recompute scheduler and the tracing report sink
//!
//! ## Architecture
//! - Implements traits defined in `petclinic-core`
//! - Contains all timers and other "impure" code

pub mod config;
pub mod repository;
pub mod scheduling;
pub mod simulation;
pub mod sink;

// Re-export commonly used items
pub use repository::InMemoryClinicRepository;
pub use scheduling::{RecomputeJob, RecomputeScheduler, RecomputeSchedulerConfig};
pub use simulation::{SimulatedCareAdvisor, SimulatedRiskModel};
pub use sink::TracingReportSink;
