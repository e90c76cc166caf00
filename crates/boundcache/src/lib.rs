//! # boundcache
//!
//! Bounded, thread-safe cache with LRU capacity eviction and per-entry TTL.
//!
//! ## Architecture
//! - **HashMap**: AHash key index into the recency list (O(1))
//! - **Recency list**: slot arena with intrusive links, oldest at the head (O(1) touch)
//! - **Eviction**: lazy, run at the start of every mutating call; removes the
//!   head while the cache is over capacity or the head has expired
//! - **Locking**: the exclusion domain is injected, so several caches can share one
//!
//! Callers pass `now` into every operation. Expired entries that are not at
//! the head are only removed once they get there, and `size()` counts them.

#![warn(missing_docs)]

mod cache;
mod error;
mod lock;
mod lru;
mod stats;

pub use cache::BoundedCache;
pub use error::{Error, Result};
pub use lock::{shared_lock, ExclusionDomain, SharedLock};
pub use stats::CacheStats;
