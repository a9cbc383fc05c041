//! Scheduling infrastructure for periodic recompute jobs
//!
//! [`RecomputeScheduler`] drives any [`RecomputeJob`] on a fixed delay: the
//! next run starts one interval after the previous one finished. It has
//! explicit start/stop, keeps the join handle of its loop and stops on a
//! cancellation token.

pub mod error;
pub mod recompute_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use recompute_scheduler::{RecomputeJob, RecomputeScheduler, RecomputeSchedulerConfig};
