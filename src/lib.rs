//! conceptscope - concept trend analytics for a course knowledge graph
//!
//! Computes time-windowed statistics over concept occurrences (frequency
//! distributions, trending and emerging concepts, cross-module overlap,
//! concept evolution and module comparison) behind a cache that fails
//! open, plus a query-intent classifier for search front-ends.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`analytics`] - View computation and the [`analytics::TrendAnalyzer`] orchestrator
//! - [`cache`] - Fail-open cache gateway over Redis or process memory
//! - [`graph`] - Abstract occurrence source and an in-memory implementation
//! - [`intent`] - Query intent classification and key-term expansion
//! - [`time`] - Time ranges, relative windows and calendar buckets
//! - [`config`] - Configuration management and settings
//! - [`health`] - Backend health tracking
//! - [`metrics`] - Prometheus metrics
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use conceptscope::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let cache = Arc::new(CacheGateway::connect(&config.cache).await);
//!     let graph = Arc::new(InMemoryGraph::new());
//!     let analyzer = TrendAnalyzer::new(graph, cache, config.analytics);
//!
//!     let params = FrequencyParams::new(TimeWindow::last_semesters(1));
//!     let result = analyzer.concept_frequencies(&params).await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod health;
pub mod intent;
pub mod metrics;
pub mod models;
pub mod time;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{
        ComparisonParams, CrossModuleParams, EmergingParams, EvolutionParams, FrequencyParams,
        TrendAnalyzer, TrendingParams, ViewKind, ViewResult, ViewStatus,
    };
    pub use crate::cache::{CacheConfig, CacheGateway};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, InvalidParameters, Result, ScopeErrorTrait};
    pub use crate::graph::{InMemoryGraph, OccurrenceQuery, OccurrenceSource};
    pub use crate::intent::{QueryAnalysis, QueryIntent, QueryIntentAnalyzer};
    pub use crate::models::ConceptOccurrence;
    pub use crate::time::{TimeRange, TimeWindow, WindowUnit};
}

// Direct re-exports for convenience
pub use models::ConceptOccurrence;
