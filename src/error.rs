//! Unified error handling for the conceptscope crate
//!
//! Every component has its own error enum; this module consolidates them
//! into a single [`Error`] so callers that cross module boundaries can use
//! one type while still matching on the domain-specific cause.
//!
//! # Architecture
//!
//! - [`ScopeErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`InvalidParameters`] - The only error a view request surfaces to callers
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use conceptscope::error::{Error, ErrorCategory, ScopeErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     match err.category() {
//!         ErrorCategory::InvalidParameters => eprintln!("bad request: {err}"),
//!         _ if err.is_recoverable() => eprintln!("temporarily unavailable: {err}"),
//!         _ => eprintln!("fatal: {err}"),
//!     }
//! }
//! ```

use chrono::{DateTime, Utc};
use std::io;
use thiserror::Error;

pub use crate::cache::CacheError;
pub use crate::graph::GraphError;

/// Common trait for all conceptscope error types
pub trait ScopeErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later call may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed request parameters, rejected before any I/O
    InvalidParameters,
    /// Graph backend failed, timed out or returned malformed data
    BackendUnavailable,
    /// Cache backend failure (never surfaced by the gateway itself)
    CacheDegraded,
    /// Configuration and validation errors
    Config,
    /// File and I/O errors
    Storage,
    /// JSON/TOML encoding errors
    Serialization,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short machine-readable label, used as a metrics label value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParameters => "invalid_parameters",
            Self::BackendUnavailable => "backend_unavailable",
            Self::CacheDegraded => "cache_degraded",
            Self::Config => "config",
            Self::Storage => "storage",
            Self::Serialization => "serialization",
            Self::Other => "other",
        }
    }
}

/// Malformed request parameters
///
/// Raised synchronously while a view request is validated, before the
/// cache or the graph is consulted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidParameters {
    #[error("Invalid time range: start {start} is not before end {end}")]
    InvertedTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Relative window must cover at least one {unit}")]
    EmptyWindow { unit: &'static str },

    #[error("Time window is outside the supported calendar range")]
    TimeOutOfRange,

    #[error("Limit {limit} is out of bounds (1..={max})")]
    LimitOutOfBounds { limit: usize, max: usize },

    #[error("Missing required filter: {0}")]
    MissingFilter(&'static str),

    #[error("Empty identifier in {field}")]
    EmptyIdentifier { field: &'static str },

    #[error("At least {required} distinct modules are required, got {got}")]
    TooFewModules { required: usize, got: usize },

    #[error("Cannot compare module {0} with itself")]
    IdenticalModules(String),

    #[error("Range spans {buckets} buckets, maximum is {max}")]
    TooManyBuckets { buckets: usize, max: usize },
}

impl ScopeErrorTrait for InvalidParameters {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::InvalidParameters
    }
}

/// Unified error type for the conceptscope crate
#[derive(Error, Debug)]
pub enum Error {
    /// Request validation errors
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] InvalidParameters),

    /// Graph facade errors
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Cache backend errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ScopeErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidParameters(e) => e.is_recoverable(),
            Self::Graph(e) => e.is_recoverable(),
            Self::Cache(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidParameters(e) => e.category(),
            Self::Graph(e) => e.category(),
            Self::Cache(e) => e.category(),
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Serialization,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_category() {
        let invalid = Error::from(InvalidParameters::MissingFilter("concept"));
        assert_eq!(invalid.category(), ErrorCategory::InvalidParameters);

        let graph = Error::from(GraphError::Timeout(Duration::from_secs(5)));
        assert_eq!(graph.category(), ErrorCategory::BackendUnavailable);

        let cache = Error::from(CacheError::Timeout(Duration::from_millis(250)));
        assert_eq!(cache.category(), ErrorCategory::CacheDegraded);
    }

    #[test]
    fn test_is_recoverable() {
        let graph = Error::from(GraphError::Unreachable("connection refused".into()));
        assert!(graph.is_recoverable());

        let invalid = Error::from(InvalidParameters::TooFewModules {
            required: 2,
            got: 1,
        });
        assert!(!invalid.is_recoverable());
    }

    #[test]
    fn test_invalid_parameters_message() {
        let err = InvalidParameters::LimitOutOfBounds { limit: 0, max: 500 };
        assert_eq!(err.to_string(), "Limit 0 is out of bounds (1..=500)");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("pool_size must be greater than 0");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(ErrorCategory::Other.as_str(), "other");
    }
}
