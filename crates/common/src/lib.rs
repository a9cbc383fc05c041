//! Concurrency building blocks shared across PetClinic crates.
//!
//! - [`cache`]: a lazily populated map whose fills are gated by a
//!   reader/writer lock so that a recalculation can invalidate it atomically
//! - [`pool`]: a bounded, shared worker pool with explicit admission control
//!   and a graceful shutdown path

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod pool;

// Re-export commonly used types
pub use cache::{CacheStats, GatedCache};
pub use pool::{
    join_all, PoolError, PoolMetrics, PoolResult, TaskHandle, WorkerPool, WorkerPoolConfig,
    WorkerPoolConfigBuilder,
};
