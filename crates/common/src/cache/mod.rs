//! Lock-gated cache of derived values
//!
//! Values in a [`GatedCache`] are derived from a shared piece of state (for
//! example a risk model). Deriving a value takes the shared side of a
//! reader/writer gate; recalculating the state takes the exclusive side and
//! wipes every cached value before the gate is released. The map itself is a
//! concurrent map, but the gate is what protects the "nothing older than the
//! last recalculation" invariant, since that spans more than one map
//! operation.
//!
//! # Example
//!
//! ```
//! use petclinic_common::cache::GatedCache;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // State is the multiplier used to derive values
//! let cache: GatedCache<u32, u32, u32> = GatedCache::new(2);
//!
//! let doubled = cache
//!     .get_or_compute(21, |factor| async move { Ok::<_, String>(21 * factor) })
//!     .await
//!     .unwrap();
//! assert_eq!(doubled, 42);
//!
//! cache.recompute(|factor| async move { Ok::<_, String>(factor + 1) }).await.unwrap();
//! assert!(cache.is_empty());
//! # }
//! ```
//!
//! # Fairness
//!
//! The gate is a [`tokio::sync::RwLock`], which queues waiters in FIFO
//! order. Once a recalculation is waiting, readers arriving after it wait
//! too, so a steady stream of misses cannot starve the writer. The cost is
//! that a pending recalculation stalls all new misses until it has run.

mod gated;
mod stats;

pub use gated::GatedCache;
pub use stats::CacheStats;
