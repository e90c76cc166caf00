//! Error types for cachedsource

use std::fmt;
use std::io;

/// Result type alias for cachedsource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cached source operations
#[derive(Debug)]
pub enum Error {
    /// The authoritative source failed
    Source(Box<dyn std::error::Error + Send + Sync>),

    /// Invalid cache configuration
    Config(String),

    /// Could not read the configuration file
    Io(io::Error),

    /// Cache construction failed
    Cache(boundcache::Error),
}

impl Error {
    /// Wrap an error returned by a [`crate::Source`]
    pub fn source_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Source(Box::new(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Source(e) => write!(f, "Source error: {}", e),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Cache(e) => write!(f, "Cache error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source(e) => Some(e.as_ref()),
            Error::Io(e) => Some(e),
            Error::Cache(e) => Some(e),
            Error::Config(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<boundcache::Error> for Error {
    fn from(err: boundcache::Error) -> Self {
        Error::Cache(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
