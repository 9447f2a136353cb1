//! Configuration management for conceptscope
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files. Every section carries serde defaults, so a file only needs the
//! values it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::analytics::ViewKind;
use crate::cache::CacheConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache gateway configuration
    pub cache: CacheConfig,

    /// Trend analyzer configuration
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trend analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Listing size when a request does not give one
    pub default_limit: usize,

    /// Largest accepted `limit`
    pub max_limit: usize,

    /// Largest number of evolution buckets in one request
    pub max_buckets: usize,

    /// Upper bound for one graph fetch in milliseconds
    pub graph_timeout_ms: u64,

    /// Cache lifetime per view
    pub ttl: TtlConfig,

    /// Emerging concept thresholds
    pub emergence: EmergenceConfig,

    /// Trending concept thresholds
    pub trending: TrendingConfig,

    /// Evolution spike detection
    pub evolution: EvolutionConfig,
}

/// Cache TTL per view, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    pub frequency_secs: u64,
    pub trending_secs: u64,
    pub emerging_secs: u64,
    pub cross_module_secs: u64,
    pub evolution_secs: u64,
    pub comparison_secs: u64,
}

/// Thresholds for a concept to count as emerging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergenceConfig {
    /// Prior-window count at or below which a concept is "rare"
    pub rare_prior_max: u64,

    /// Minimum current-window count
    pub min_current_count: u64,

    /// Minimum relative growth when the prior count is non-zero
    pub min_growth_rate: f64,
}

/// Thresholds for a concept to count as trending
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingConfig {
    /// Minimum relative growth (0.25 = +25%)
    pub min_relative_growth: f64,

    /// Minimum absolute growth in occurrences
    pub min_absolute_growth: u64,
}

/// Spike detection over evolution series
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Multiple of the trailing average that marks a spike
    pub spike_threshold: f64,

    /// Trailing window length in buckets
    pub spike_window: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 500,
            max_buckets: 260,
            graph_timeout_ms: 5000,
            ttl: TtlConfig::default(),
            emergence: EmergenceConfig::default(),
            trending: TrendingConfig::default(),
            evolution: EvolutionConfig::default(),
        }
    }
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            frequency_secs: 300,
            trending_secs: 900,
            emerging_secs: 900,
            cross_module_secs: 21_600,
            evolution_secs: 21_600,
            comparison_secs: 3600,
        }
    }
}

impl Default for EmergenceConfig {
    fn default() -> Self {
        Self {
            rare_prior_max: 0,
            min_current_count: 2,
            min_growth_rate: 1.0,
        }
    }
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            min_relative_growth: 0.25,
            min_absolute_growth: 2,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            spike_threshold: 2.0,
            spike_window: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl AnalyticsConfig {
    /// Cache lifetime for a view
    #[must_use]
    pub fn ttl_for(&self, view: ViewKind) -> Duration {
        let secs = match view {
            ViewKind::Frequency => self.ttl.frequency_secs,
            ViewKind::Trending => self.ttl.trending_secs,
            ViewKind::Emerging => self.ttl.emerging_secs,
            ViewKind::CrossModule => self.ttl.cross_module_secs,
            ViewKind::Evolution => self.ttl.evolution_secs,
            ViewKind::Comparison => self.ttl.comparison_secs,
        };
        Duration::from_secs(secs)
    }

    /// Get graph timeout as Duration
    #[must_use]
    pub fn graph_timeout(&self) -> Duration {
        Duration::from_millis(self.graph_timeout_ms)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut analytics = AnalyticsConfig::default();

        if let Some(v) = env_parse("CONCEPTSCOPE_DEFAULT_LIMIT") {
            analytics.default_limit = v;
        }
        if let Some(v) = env_parse("CONCEPTSCOPE_MAX_LIMIT") {
            analytics.max_limit = v;
        }
        if let Some(v) = env_parse("CONCEPTSCOPE_MAX_BUCKETS") {
            analytics.max_buckets = v;
        }
        if let Some(v) = env_parse("CONCEPTSCOPE_GRAPH_TIMEOUT_MS") {
            analytics.graph_timeout_ms = v;
        }
        if let Some(v) = env_parse("CONCEPTSCOPE_EMERGING_MIN_COUNT") {
            analytics.emergence.min_current_count = v;
        }
        if let Some(v) = env_parse("CONCEPTSCOPE_TRENDING_MIN_GROWTH") {
            analytics.trending.min_relative_growth = v;
        }

        let level =
            std::env::var("CONCEPTSCOPE_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let format =
            std::env::var("CONCEPTSCOPE_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            cache: CacheConfig::from_env(),
            analytics,
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let a = &self.analytics;

        if self.cache.pool_size == 0 {
            anyhow::bail!("cache.pool_size must be greater than 0");
        }

        if self.cache.op_timeout_ms == 0 {
            anyhow::bail!("cache.op_timeout_ms must be greater than 0");
        }

        if a.max_limit == 0 {
            anyhow::bail!("analytics.max_limit must be greater than 0");
        }

        if a.default_limit == 0 || a.default_limit > a.max_limit {
            anyhow::bail!(
                "analytics.default_limit must be between 1 and max_limit ({})",
                a.max_limit
            );
        }

        if a.max_buckets == 0 {
            anyhow::bail!("analytics.max_buckets must be greater than 0");
        }

        if a.graph_timeout_ms == 0 {
            anyhow::bail!("analytics.graph_timeout_ms must be greater than 0");
        }

        if a.emergence.min_current_count == 0 {
            anyhow::bail!("analytics.emergence.min_current_count must be greater than 0");
        }

        if a.emergence.min_growth_rate < 0.0 || a.trending.min_relative_growth < 0.0 {
            anyhow::bail!("growth thresholds must not be negative");
        }

        if a.evolution.spike_window == 0 || a.evolution.spike_threshold <= 0.0 {
            anyhow::bail!("analytics.evolution needs a positive spike_window and spike_threshold");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }
}
