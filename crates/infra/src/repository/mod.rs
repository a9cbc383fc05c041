//! Repository implementations of the lookup ports

mod in_memory;

pub use in_memory::InMemoryClinicRepository;
