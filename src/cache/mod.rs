//! Fail-open cache gateway for computed analytic views
//!
//! The gateway sits in front of a [`CacheBackend`] (Redis in production,
//! an in-process map for single-node use and tests) and guarantees:
//! - `get` never fails: backend errors, timeouts and undecodable values
//!   are logged and reported as a miss
//! - `set` never fails: the value is fully serialized before the backend
//!   is touched, and any backend failure is a silent [`SetOutcome::Ignored`]
//! - every backend call is attempted once, bounded by `op_timeout_ms`
//!
//! Cache failures are only observable through [`CacheGateway::health`] and
//! [`CacheGateway::stats`].
//!
//! # Example
//!
//! ```rust,ignore
//! use conceptscope::cache::{CacheConfig, CacheGateway};
//!
//! let config = CacheConfig::from_env();
//! let cache = CacheGateway::connect(&config).await;
//!
//! cache.set("k", &vec![1, 2, 3], Duration::from_secs(60)).await;
//! let cached: Option<Vec<u32>> = cache.get("k").await;
//! ```

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::error::{ErrorCategory, ScopeErrorTrait};
use crate::health::{ComponentHealth, ComponentSnapshot};

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Use the cache at all; when false every lookup is a miss
    pub enabled: bool,

    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,

    /// Connection pool size
    pub pool_size: usize,

    /// Upper bound for a single cache call in milliseconds
    pub op_timeout_ms: u64,

    /// Key prefix for namespacing
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "redis://localhost:6379".to_string(),
            pool_size: 8,
            op_timeout_ms: 250,
            key_prefix: "conceptscope".to_string(),
        }
    }
}

impl CacheConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("CONCEPTSCOPE_CACHE_ENABLED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.enabled),
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            pool_size: std::env::var("REDIS_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pool_size),
            op_timeout_ms: std::env::var("CONCEPTSCOPE_CACHE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.op_timeout_ms),
            key_prefix: std::env::var("CONCEPTSCOPE_CACHE_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }

    /// Per-call timeout as Duration
    #[must_use]
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

/// Errors raised by cache backends
///
/// The gateway swallows all of these; they only surface through health
/// reporting.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cache command failed: {0}")]
    Command(String),

    #[error("Cache serialization failed: {0}")]
    Serialization(String),
}

impl ScopeErrorTrait for CacheError {
    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Serialization(_))
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::CacheDegraded
    }
}

/// Raw key/value store with TTL
///
/// Implementations issue independent, single-command operations and must
/// tolerate concurrent callers without external locking.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch raw bytes for a key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store raw bytes for a key, replacing any previous value
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Lightweight liveness probe
    async fn ping(&self) -> Result<(), CacheError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Release connections
    async fn shutdown(&self) {}
}

/// Result of a best-effort write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SetOutcome {
    Stored,
    Ignored,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses (including failed lookups)
    pub misses: u64,
    /// Backend or decoding failures
    pub errors: u64,
    /// Successful writes
    pub writes: u64,
    /// Writes dropped because of a failure
    pub ignored_writes: u64,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    writes: AtomicU64,
    ignored_writes: AtomicU64,
}

/// Shared, fail-open cache handle
///
/// Construct once at startup and share through `Arc`.
pub struct CacheGateway {
    backend: Option<Arc<dyn CacheBackend>>,
    key_prefix: String,
    op_timeout: Duration,
    counters: Counters,
    health: ComponentHealth,
}

impl CacheGateway {
    /// Gateway over an explicit backend
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend: Some(backend),
            key_prefix: config.key_prefix.clone(),
            op_timeout: config.op_timeout(),
            counters: Counters::default(),
            health: ComponentHealth::new("cache"),
        }
    }

    /// Gateway that never caches
    pub fn disabled(config: &CacheConfig) -> Self {
        Self {
            backend: None,
            key_prefix: config.key_prefix.clone(),
            op_timeout: config.op_timeout(),
            counters: Counters::default(),
            health: ComponentHealth::new("cache"),
        }
    }

    /// Gateway over an in-process backend
    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), config)
    }

    /// Build the Redis-backed gateway described by `config`
    ///
    /// Connections are opened lazily, so an unreachable Redis does not fail
    /// construction; it is logged and every call fails open until Redis
    /// comes back.
    pub async fn connect(config: &CacheConfig) -> Self {
        if !config.enabled {
            tracing::info!("Cache disabled by configuration");
            return Self::disabled(config);
        }

        let backend = match RedisBackend::new(config) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, continuing without cache");
                return Self::disabled(config);
            }
        };

        let gateway = Self::new(Arc::new(backend), config);
        if gateway.is_available().await {
            tracing::info!(url = %config.url, "Connected to Redis");
        } else {
            tracing::warn!(url = %config.url, "Redis not reachable yet, cache will fail open");
        }
        gateway
    }

    /// Check if a backend is configured at all
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    // =========================================================================
    // Key Generation
    // =========================================================================

    /// Stable hex digest of the JSON form of `params`
    pub fn fingerprint<P: Serialize + ?Sized>(params: &P) -> Result<String, CacheError> {
        let bytes =
            serde_json::to_vec(params).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Generate cache key for a computed view
    pub fn view_key(&self, view: &str, fingerprint: &str) -> String {
        format!("{}:view:{}:{}", self.key_prefix, view, fingerprint)
    }

    // =========================================================================
    // Generic Operations
    // =========================================================================

    /// Get a value, treating every failure as a miss
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let Some(backend) = &self.backend else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let bytes = match tokio::time::timeout(self.op_timeout, backend.get(key)).await {
            Ok(Ok(bytes)) => {
                self.health.record_success();
                bytes
            }
            Ok(Err(e)) => {
                self.record_error("get", key, &e);
                None
            }
            Err(_) => {
                self.record_error("get", key, &CacheError::Timeout(self.op_timeout));
                None
            }
        };

        let Some(bytes) = bytes else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        match decode(&bytes) {
            Ok(value) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                crate::metrics::record_cache_error("decode");
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Set a value with TTL; failures are ignored
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> SetOutcome {
        let Some(backend) = &self.backend else {
            return SetOutcome::Ignored;
        };

        let bytes = match encode(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                self.counters.ignored_writes.fetch_add(1, Ordering::Relaxed);
                crate::metrics::record_cache_error("encode");
                tracing::warn!(key = %key, error = %e, "Skipping cache write");
                return SetOutcome::Ignored;
            }
        };

        match tokio::time::timeout(self.op_timeout, backend.set(key, bytes, ttl)).await {
            Ok(Ok(())) => {
                self.health.record_success();
                self.counters.writes.fetch_add(1, Ordering::Relaxed);
                SetOutcome::Stored
            }
            Ok(Err(e)) => {
                self.record_error("set", key, &e);
                self.counters.ignored_writes.fetch_add(1, Ordering::Relaxed);
                SetOutcome::Ignored
            }
            Err(_) => {
                self.record_error("set", key, &CacheError::Timeout(self.op_timeout));
                self.counters.ignored_writes.fetch_add(1, Ordering::Relaxed);
                SetOutcome::Ignored
            }
        }
    }

    /// Liveness probe for health reporting
    pub async fn is_available(&self) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match tokio::time::timeout(self.op_timeout, backend.ping()).await {
            Ok(Ok(())) => {
                self.health.record_success();
                true
            }
            Ok(Err(e)) => {
                self.record_error("ping", "", &e);
                false
            }
            Err(_) => {
                self.record_error("ping", "", &CacheError::Timeout(self.op_timeout));
                false
            }
        }
    }

    fn record_error(&self, operation: &'static str, key: &str, error: &CacheError) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
        self.health.record_failure(error);
        crate::metrics::record_cache_error(operation);
        tracing::warn!(
            operation = operation,
            key = %key,
            error = %error,
            "Cache call failed, continuing without cache"
        );
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            ignored_writes: self.counters.ignored_writes.load(Ordering::Relaxed),
        }
    }

    /// Outcome of the last cache call
    pub fn health(&self) -> ComponentSnapshot {
        self.health.snapshot()
    }

    /// Release backend connections
    pub async fn shutdown(&self) {
        if let Some(backend) = &self.backend {
            backend.shutdown().await;
            tracing::info!(backend = backend.name(), "Cache gateway shut down");
        }
    }
}

// ============================================================================
// Serialization helpers using JSON
// ============================================================================

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CacheError> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
}
