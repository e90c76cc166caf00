//! Authoritative source behind the cache

use std::fmt::Debug;
use std::hash::Hash;

/// Keyed store that owns the real values, e.g. a rate database or a
/// remote rate service
pub trait Source: Send + Sync {
    /// Lookup key
    type Key: Hash + Eq + Clone + Debug;

    /// Stored value
    type Value: Clone;

    /// Failure reported by the source
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the value stored under `key`
    fn fetch(&self, key: &Self::Key) -> Result<Self::Value, Self::Error>;

    /// Fetch every value
    fn fetch_all(&self) -> Result<Vec<Self::Value>, Self::Error>;

    /// Store `value` under `key`
    fn store(&self, key: Self::Key, value: Self::Value) -> Result<(), Self::Error>;
}
