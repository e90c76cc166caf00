//! Exclusion domains handed to caches at construction
//!
//! A cache never owns its lock. Several caches built from clones of the
//! same [`SharedLock`] serialize against each other: no two operations on
//! any of them run at the same time. The domain is not reentrant, so a
//! thread holding a guard must not call into a cache of that domain.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock-like object guarding one or more caches
pub trait ExclusionDomain: Send + Sync {
    /// Guard held by operations that may mutate cache state
    type Exclusive<'a>
    where
        Self: 'a;

    /// Guard held by read-only operations
    type Shared<'a>
    where
        Self: 'a;

    /// Block until exclusive access is granted
    fn exclusive(&self) -> Self::Exclusive<'_>;

    /// Block until shared access is granted
    fn shared(&self) -> Self::Shared<'_>;
}

impl ExclusionDomain for RwLock<()> {
    type Exclusive<'a> = RwLockWriteGuard<'a, ()>;
    type Shared<'a> = RwLockReadGuard<'a, ()>;

    fn exclusive(&self) -> Self::Exclusive<'_> {
        self.write()
    }

    fn shared(&self) -> Self::Shared<'_> {
        self.read()
    }
}

/// A plain mutex has no reader mode: shared access is exclusive too.
impl ExclusionDomain for Mutex<()> {
    type Exclusive<'a> = MutexGuard<'a, ()>;
    type Shared<'a> = MutexGuard<'a, ()>;

    fn exclusive(&self) -> Self::Exclusive<'_> {
        self.lock()
    }

    fn shared(&self) -> Self::Shared<'_> {
        self.lock()
    }
}

/// Default exclusion domain, cloneable across caches
pub type SharedLock = Arc<RwLock<()>>;

/// Create a fresh reader/writer exclusion domain
pub fn shared_lock() -> SharedLock {
    Arc::new(RwLock::new(()))
}
