//! Care tips: a two-level fan-out over the shared worker pool
//!
//! [`CareTipsService`] starts one [`OwnerCareTask`] per owner; each owner
//! task submits one [`PetCareTask`] per pet and joins their tips. Owner tasks
//! are coordinators: they run alongside the pool's workers but never hold a
//! worker slot while waiting, so no pool size can deadlock the traversal.

pub mod ports;
mod service;
mod tasks;

pub use service::CareTipsService;
pub use tasks::{OwnerCareTask, PetCareTask};
