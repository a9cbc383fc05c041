//! Bounded worker pool shared by fan-out computations
//!
//! The pool is a cheap, clonable handle around a tokio task tracker and two
//! semaphores:
//!
//! - **worker slots** bound how many submitted tasks run at once
//! - **admission** (only when `max_queue` is set) bounds how many tasks may
//!   be submitted but unfinished; anything beyond is rejected with
//!   [`PoolError::Exhausted`] instead of being queued
//!
//! Coordinating tasks, i.e. tasks that only submit other tasks and wait for
//! them, are started with [`WorkerPool::spawn_coordinator`]. They run on the
//! same runtime but never occupy a worker slot, so a parent waiting on its
//! children cannot starve those children of slots.
//!
//! # Example
//!
//! ```
//! use petclinic_common::pool::{join_all, WorkerPool, WorkerPoolConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), petclinic_common::pool::PoolError> {
//! let pool = WorkerPool::new(WorkerPoolConfig::builder().workers(2).build()?);
//!
//! let handles = (1..=3)
//!     .map(|n| pool.submit(async move { n * 10 }))
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! assert_eq!(join_all(handles).await?, vec![10, 20, 30]);
//! pool.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod worker_pool;

pub use config::{WorkerPoolConfig, WorkerPoolConfigBuilder};
pub use error::{PoolError, PoolResult};
pub use worker_pool::{join_all, PoolMetrics, TaskHandle, WorkerPool};
