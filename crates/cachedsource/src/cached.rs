//! CachedSource: BoundedCache in front of a Source

use std::time::Duration;

use boundcache::{shared_lock, BoundedCache, CacheStats, SharedLock};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::source::Source;

/// Read-through cache layer over a [`Source`]
pub struct CachedSource<S: Source, C = SystemClock> {
    /// Authoritative store
    source: S,

    /// Supplies `now` for every cache call
    clock: C,

    /// TTL applied to every cached entry
    ttl: Duration,

    /// `None` when caching is disabled
    cache: Option<BoundedCache<S::Key, S::Value>>,
}

impl<S: Source> CachedSource<S, SystemClock> {
    /// Create a cached source with its own exclusion domain
    ///
    /// # Arguments
    /// * `source` - Authoritative store
    /// * `config` - Cache settings
    ///
    /// # Returns
    /// * `Result<CachedSource>` - Fails on an invalid config
    pub fn new(source: S, config: &CacheConfig) -> Result<Self> {
        Self::with_lock(source, config, shared_lock())
    }

    /// Create a cached source whose cache joins an existing exclusion domain
    pub fn with_lock(source: S, config: &CacheConfig, lock: SharedLock) -> Result<Self> {
        Self::with_clock(source, config, lock, SystemClock)
    }
}

impl<S: Source, C: Clock> CachedSource<S, C> {
    /// Create a cached source reading time from `clock`
    pub fn with_clock(source: S, config: &CacheConfig, lock: SharedLock, clock: C) -> Result<Self> {
        config.validate()?;

        let cache = if config.enable {
            Some(BoundedCache::new(lock, config.size)?)
        } else {
            None
        };

        debug!(
            enable = config.enable,
            size = config.size,
            ttl_secs = config.ttl,
            "cached source ready"
        );

        Ok(Self {
            source,
            clock,
            ttl: config.ttl(),
            cache,
        })
    }

    /// Get a value from the cache, or from the source on a miss
    ///
    /// A value fetched from the source is cached before it is returned.
    /// Source failures are returned as-is and leave the cache untouched.
    pub fn get(&self, key: &S::Key) -> Result<S::Value> {
        if let Some(value) = self.lookup(key) {
            debug!(?key, "cache hit");
            return Ok(value);
        }

        let value = self.source.fetch(key).map_err(|err| {
            warn!(?key, error = %err, "source fetch failed");
            Error::source_error(err)
        })?;

        debug!(?key, "cache refilled from source");
        self.remember(key.clone(), value.clone());

        Ok(value)
    }

    /// Get every value straight from the source (bypasses cache)
    pub fn get_all(&self) -> Result<Vec<S::Value>> {
        self.source.fetch_all().map_err(Error::source_error)
    }

    /// Refresh the cached value, then write it to the source
    pub fn update(&self, key: S::Key, value: S::Value) -> Result<()> {
        self.remember(key.clone(), value.clone());

        self.source.store(key, value).map_err(|err| {
            warn!(error = %err, "source store failed");
            Error::source_error(err)
        })
    }

    /// Get cache statistics, if caching is enabled
    pub fn stats(&self) -> Option<&CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    /// Get current cache size (0 when disabled)
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.size())
    }

    /// Check whether caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Get the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    fn lookup(&self, key: &S::Key) -> Option<S::Value> {
        let cache = self.cache.as_ref()?;
        let value = cache.lookup(self.clock.now(), key);
        if value.is_none() {
            debug!(?key, "cache miss");
        }
        value
    }

    fn remember(&self, key: S::Key, value: S::Value) {
        if let Some(cache) = &self.cache {
            cache.insert_or_refresh(self.clock.now(), key, value, self.ttl);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Rate {
        code: String,
        value: f64,
    }

    fn rate(code: &str, value: f64) -> Rate {
        Rate {
            code: code.to_string(),
            value,
        }
    }

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "rate service unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    #[derive(Default)]
    struct FakeRates {
        rates: Mutex<HashMap<String, Rate>>,
        fetches: AtomicUsize,
        down: AtomicBool,
    }

    impl FakeRates {
        fn with(rates: &[Rate]) -> Self {
            let source = Self::default();
            for r in rates {
                source.rates.lock().insert(r.code.clone(), r.clone());
            }
            source
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl Source for FakeRates {
        type Key = String;
        type Value = Rate;
        type Error = Unavailable;

        fn fetch(&self, key: &String) -> std::result::Result<Rate, Unavailable> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                return Err(Unavailable);
            }
            self.rates.lock().get(key).cloned().ok_or(Unavailable)
        }

        fn fetch_all(&self) -> std::result::Result<Vec<Rate>, Unavailable> {
            let mut all: Vec<Rate> = self.rates.lock().values().cloned().collect();
            all.sort_by(|a, b| a.code.cmp(&b.code));
            Ok(all)
        }

        fn store(&self, key: String, value: Rate) -> std::result::Result<(), Unavailable> {
            if self.down.load(Ordering::SeqCst) {
                return Err(Unavailable);
            }
            self.rates.lock().insert(key, value);
            Ok(())
        }
    }

    fn config(size: usize, ttl: u64) -> CacheConfig {
        CacheConfig {
            enable: true,
            size,
            ttl,
        }
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.timestamp_opt(1_667_134_870, 0).unwrap())
    }

    fn cached(source: FakeRates, config: &CacheConfig) -> CachedSource<FakeRates, ManualClock> {
        CachedSource::with_clock(source, config, shared_lock(), clock()).unwrap()
    }

    #[test]
    fn test_miss_fetches_and_caches() {
        let cached = cached(FakeRates::with(&[rate("USD", 61.5)]), &config(10, 60));

        assert_eq!(cached.get(&"USD".to_string()).unwrap(), rate("USD", 61.5));
        assert_eq!(cached.get(&"USD".to_string()).unwrap(), rate("USD", 61.5));

        assert_eq!(cached.source().fetches(), 1);
        assert_eq!(cached.cache_len(), 1);
        let stats = cached.stats().unwrap();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
    }

    #[test]
    fn test_expired_entry_is_refetched() {
        let cached = cached(FakeRates::with(&[rate("EUR", 63.0)]), &config(10, 60));

        cached.get(&"EUR".to_string()).unwrap();
        cached.clock.advance(chrono::Duration::seconds(60));
        cached.get(&"EUR".to_string()).unwrap();
        assert_eq!(cached.source().fetches(), 1);

        // Touched again at +60, so it lives through +120.
        cached.clock.advance(chrono::Duration::seconds(61));
        cached.get(&"EUR".to_string()).unwrap();
        assert_eq!(cached.source().fetches(), 2);
    }

    #[test]
    fn test_source_error_propagates_and_caches_nothing() {
        let source = FakeRates::with(&[rate("CNY", 8.4)]);
        source.down.store(true, Ordering::SeqCst);
        let cached = cached(source, &config(10, 60));

        let err = cached.get(&"CNY".to_string()).unwrap_err();

        assert!(matches!(err, Error::Source(_)));
        assert_eq!(cached.cache_len(), 0);
    }

    #[test]
    fn test_unknown_key_is_source_error() {
        let cached = cached(FakeRates::default(), &config(10, 60));

        assert!(cached.get(&"XXX".to_string()).is_err());
        assert_eq!(cached.cache_len(), 0);
    }

    #[test]
    fn test_update_refreshes_cache_and_source() {
        let cached = cached(FakeRates::with(&[rate("USD", 61.5)]), &config(10, 60));
        cached.get(&"USD".to_string()).unwrap();

        cached.update("USD".to_string(), rate("USD", 60.9)).unwrap();

        assert_eq!(cached.get(&"USD".to_string()).unwrap(), rate("USD", 60.9));
        assert_eq!(cached.source().fetches(), 1);
        assert_eq!(
            cached.source().rates.lock().get("USD"),
            Some(&rate("USD", 60.9))
        );
    }

    #[test]
    fn test_update_store_failure_still_caches() {
        let source = FakeRates::default();
        source.down.store(true, Ordering::SeqCst);
        let cached = cached(source, &config(10, 60));

        assert!(cached.update("USD".to_string(), rate("USD", 60.9)).is_err());
        assert_eq!(cached.cache_len(), 1);
    }

    #[test]
    fn test_capacity_bounds_cache() {
        let source = FakeRates::with(&[rate("USD", 61.5), rate("EUR", 63.0), rate("CNY", 8.4)]);
        let cached = cached(source, &config(2, 60));

        for code in ["USD", "EUR", "CNY"] {
            cached.get(&code.to_string()).unwrap();
        }
        assert_eq!(cached.cache_len(), 2);

        cached.get(&"USD".to_string()).unwrap();
        assert_eq!(cached.source().fetches(), 4);
    }

    #[test]
    fn test_get_all_bypasses_cache() {
        let source = FakeRates::with(&[rate("USD", 61.5), rate("EUR", 63.0)]);
        let cached = cached(source, &config(10, 60));

        let all = cached.get_all().unwrap();

        assert_eq!(all, vec![rate("EUR", 63.0), rate("USD", 61.5)]);
        assert_eq!(cached.cache_len(), 0);
    }

    #[test]
    fn test_disabled_goes_to_source() {
        let disabled = CacheConfig {
            enable: false,
            size: 0,
            ttl: 60,
        };
        let cached = cached(FakeRates::with(&[rate("USD", 61.5)]), &disabled);

        cached.get(&"USD".to_string()).unwrap();
        cached.get(&"USD".to_string()).unwrap();

        assert!(!cached.is_enabled());
        assert!(cached.stats().is_none());
        assert_eq!(cached.cache_len(), 0);
        assert_eq!(cached.source().fetches(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = CachedSource::new(FakeRates::default(), &config(0, 60));

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_shared_lock_between_sources() {
        let lock = shared_lock();
        let rates =
            CachedSource::with_lock(FakeRates::with(&[rate("USD", 61.5)]), &config(4, 60), lock.clone())
                .unwrap();
        let reports =
            CachedSource::with_lock(FakeRates::with(&[rate("EUR", 63.0)]), &config(4, 60), lock)
                .unwrap();

        rates.get(&"USD".to_string()).unwrap();
        reports.get(&"EUR".to_string()).unwrap();

        assert_eq!(rates.cache_len(), 1);
        assert_eq!(reports.cache_len(), 1);
    }
}
