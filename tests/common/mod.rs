//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use conceptscope::analytics::TrendAnalyzer;
use conceptscope::cache::{CacheBackend, CacheConfig, CacheError, CacheGateway};
use conceptscope::config::AnalyticsConfig;
use conceptscope::graph::{GraphError, InMemoryGraph, OccurrenceQuery, OccurrenceSource};
use conceptscope::models::ConceptOccurrence;
use conceptscope::time::FixedClock;

/// Timestamp helper
pub fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Fixed "now" used by every analyzer built here: Friday 2024-03-15 noon
pub fn now() -> DateTime<Utc> {
    ts(2024, 3, 15, 12)
}

pub fn occ(concept: &str, module: &str, at: DateTime<Utc>) -> ConceptOccurrence {
    ConceptOccurrence::new(concept, module, at)
}

/// Repeat one occurrence `n` times
pub fn repeat(concept: &str, module: &str, at: DateTime<Utc>, n: usize) -> Vec<ConceptOccurrence> {
    (0..n).map(|_| occ(concept, module, at)).collect()
}

/// A small course history
///
/// Current week (2024-03-11 .. 2024-03-18):
/// - graphs: 5, trees: 5, hashing: 3, recursion: 3 (new)
///
/// Previous week (2024-03-04 .. 2024-03-11):
/// - graphs: 2, trees: 5, hashing: 1
pub fn sample_facts() -> Vec<ConceptOccurrence> {
    let mut facts = Vec::new();
    facts.extend(repeat("graphs", "CS101", ts(2024, 3, 12, 9), 3));
    facts.extend(repeat("graphs", "CS202", ts(2024, 3, 13, 9), 2));
    facts.extend(repeat("trees", "CS101", ts(2024, 3, 14, 9), 5));
    facts.extend(repeat("hashing", "CS202", ts(2024, 3, 11, 9), 3));
    facts.extend(repeat("recursion", "CS101", ts(2024, 3, 15, 8), 3));

    facts.extend(repeat("graphs", "CS101", ts(2024, 3, 5, 9), 2));
    facts.extend(repeat("trees", "CS101", ts(2024, 3, 6, 9), 5));
    facts.extend(repeat("hashing", "CS202", ts(2024, 3, 7, 9), 1));
    facts
}

pub fn cache_config() -> CacheConfig {
    CacheConfig {
        op_timeout_ms: 50,
        ..CacheConfig::default()
    }
}

pub fn analytics_config() -> AnalyticsConfig {
    AnalyticsConfig {
        graph_timeout_ms: 200,
        ..AnalyticsConfig::default()
    }
}

/// Analyzer over `source` and `cache`, pinned to [`now`]
pub fn analyzer(source: Arc<dyn OccurrenceSource>, cache: Arc<CacheGateway>) -> TrendAnalyzer {
    TrendAnalyzer::new(source, cache, analytics_config()).with_clock(Arc::new(FixedClock(now())))
}

/// Analyzer over [`sample_facts`] with an in-memory cache
pub fn sample_analyzer() -> (TrendAnalyzer, Arc<CountingGraph>) {
    let graph = Arc::new(CountingGraph::new(sample_facts()));
    let cache = Arc::new(CacheGateway::in_memory(&cache_config()));
    (analyzer(graph.clone(), cache), graph)
}

/// In-memory graph that counts fetches
pub struct CountingGraph {
    inner: InMemoryGraph,
    calls: AtomicUsize,
}

impl CountingGraph {
    pub fn new(facts: Vec<ConceptOccurrence>) -> Self {
        Self {
            inner: InMemoryGraph::with_occurrences(facts),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.set_offline(offline);
    }
}

#[async_trait]
impl OccurrenceSource for CountingGraph {
    async fn fetch_occurrences(
        &self,
        query: &OccurrenceQuery,
    ) -> Result<Vec<ConceptOccurrence>, GraphError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_occurrences(query).await
    }
}

/// Graph that never answers in time
pub struct StalledGraph;

#[async_trait]
impl OccurrenceSource for StalledGraph {
    async fn fetch_occurrences(
        &self,
        _query: &OccurrenceQuery,
    ) -> Result<Vec<ConceptOccurrence>, GraphError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(Vec::new())
    }
}

/// Graph that ignores the requested range
pub struct SloppyGraph(pub Vec<ConceptOccurrence>);

#[async_trait]
impl OccurrenceSource for SloppyGraph {
    async fn fetch_occurrences(
        &self,
        _query: &OccurrenceQuery,
    ) -> Result<Vec<ConceptOccurrence>, GraphError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "sloppy"
    }
}

/// Cache backend whose every call fails
pub struct DownBackend;

#[async_trait]
impl CacheBackend for DownBackend {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}
