//! # cachedsource
//!
//! Read-through cache in front of a keyed, authoritative source.
//!
//! A lookup that misses the [`boundcache::BoundedCache`] goes to the
//! source, and the fetched value is inserted with the configured TTL.
//! Writes refresh the cache before they reach the source. With caching
//! disabled every call goes straight through.

#![warn(missing_docs)]

mod cached;
mod clock;
mod config;
mod error;
mod source;

pub use boundcache::{shared_lock, CacheStats, SharedLock};
pub use cached::CachedSource;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use source::Source;
