//! Cache configuration
//!
//! ```toml
//! enable = true
//! size = 1024
//! ttl = 300
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

const DEFAULT_SIZE: usize = 1024;
const DEFAULT_TTL_SECS: u64 = 300;

/// Settings for one read-through cache
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Turn caching on; when off every call goes to the source
    pub enable: bool,

    /// Maximum number of cached entries
    pub size: usize,

    /// Entry time-to-live in whole seconds
    pub ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable: true,
            size: DEFAULT_SIZE,
            ttl: DEFAULT_TTL_SECS,
        }
    }
}

impl CacheConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: CacheConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Reject settings the cache cannot be built with
    pub fn validate(&self) -> Result<()> {
        if self.enable && self.size == 0 {
            return Err(Error::Config(
                "size must be greater than 0 when the cache is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// TTL as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }
}
