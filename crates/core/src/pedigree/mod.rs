//! Pedigree tracking, in beta for a single pet
//!
//! A pedigree update toggles the pet's name between its raw and titled form
//! (`"Basil"` and `"Basil The Second"`) in the store and in every cached
//! pedigree text.

pub mod ports;
mod service;

pub use service::PedigreeService;
