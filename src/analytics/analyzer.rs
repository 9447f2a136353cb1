//! Trend analyzer: cache-first orchestration of every analytic view
//!
//! Each view follows the same path:
//! 1. validate and canonicalize the parameters (the only hard failure)
//! 2. derive the cache key from the canonical request
//! 3. serve a cached payload if there is one
//! 4. otherwise fetch occurrences from the graph under a timeout; any
//!    failure or malformed fact turns into a degraded result
//! 5. aggregate, write back to the cache with the view's TTL, return

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::evolution::{evolve, ConceptEvolution};
use super::frequency::{frequency_report, FrequencyReport};
use super::overlap::{compare, cross_module, CrossModuleAnalysis, ModuleComparison};
use super::params::{
    ComparisonParams, CrossModuleParams, EmergingParams, EvolutionParams, FrequencyParams,
    TrendingParams,
};
use super::trends::{classify, EmergingReport, TrendingReport};
use super::view::{ViewKind, ViewResult};
use crate::cache::CacheGateway;
use crate::config::AnalyticsConfig;
use crate::error::InvalidParameters;
use crate::graph::{GraphError, OccurrenceQuery, OccurrenceSource};
use crate::health::{ComponentHealth, HealthReport};
use crate::metrics;
use crate::models::ConceptOccurrence;
use crate::time::{Clock, SystemClock};

/// Result type of every view operation
pub type ViewOutcome<T> = Result<ViewResult<T>, InvalidParameters>;

/// Computes analytic views over an [`OccurrenceSource`], cache first
///
/// Holds no per-request state; share one instance through `Arc`.
pub struct TrendAnalyzer {
    source: Arc<dyn OccurrenceSource>,
    cache: Arc<CacheGateway>,
    config: AnalyticsConfig,
    clock: Arc<dyn Clock>,
    graph_health: ComponentHealth,
}

impl TrendAnalyzer {
    pub fn new(
        source: Arc<dyn OccurrenceSource>,
        cache: Arc<CacheGateway>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            source,
            cache,
            config,
            clock: Arc::new(SystemClock),
            graph_health: ComponentHealth::new("graph"),
        }
    }

    /// Resolve relative windows against `clock` instead of the wall clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheGateway {
        &self.cache
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Ranked concept frequencies in a window
    pub async fn concept_frequencies(&self, params: &FrequencyParams) -> ViewOutcome<FrequencyReport> {
        let view = ViewKind::Frequency;
        let request = self.validate(view, params.resolve(self.clock.now(), &self.config))?;

        let (range, limit) = (request.range, request.limit);
        Ok(self
            .serve(view, &request, request.query(), |facts| {
                frequency_report(range, facts, limit)
            })
            .await)
    }

    /// Concepts growing against the preceding window
    pub async fn trending_concepts(&self, params: &TrendingParams) -> ViewOutcome<TrendingReport> {
        let view = ViewKind::Trending;
        let request = self.validate(view, params.resolve(self.clock.now(), &self.config))?;
        let prior_range = self.validate(view, request.prior_range())?;
        let query = self.validate(view, request.comparison_query())?;

        let key = (&request, &self.config.emergence, &self.config.trending);
        Ok(self
            .serve(view, &key, query, |facts| {
                let mut classes = classify(
                    &request.range,
                    &prior_range,
                    facts,
                    &self.config.emergence,
                    &self.config.trending,
                );
                classes.trending.truncate(request.limit);
                TrendingReport {
                    range: request.range,
                    prior_range,
                    concepts: classes.trending,
                }
            })
            .await)
    }

    /// Concepts new to, or rising from near-absence in, a window
    pub async fn emerging_concepts(&self, params: &EmergingParams) -> ViewOutcome<EmergingReport> {
        let view = ViewKind::Emerging;
        let request = self.validate(view, params.resolve(self.clock.now(), &self.config))?;
        let prior_range = self.validate(view, request.prior_range())?;
        let query = self.validate(view, request.comparison_query())?;

        let key = (&request, &self.config.emergence);
        Ok(self
            .serve(view, &key, query, |facts| {
                let mut classes = classify(
                    &request.range,
                    &prior_range,
                    facts,
                    &self.config.emergence,
                    &self.config.trending,
                );
                classes.emerging.truncate(request.limit);
                EmergingReport {
                    range: request.range,
                    prior_range,
                    concepts: classes.emerging,
                }
            })
            .await)
    }

    /// Concept overlap across two or more modules
    pub async fn cross_module_analysis(
        &self,
        params: &CrossModuleParams,
    ) -> ViewOutcome<CrossModuleAnalysis> {
        let view = ViewKind::CrossModule;
        let request = self.validate(view, params.resolve(self.clock.now()))?;

        Ok(self
            .serve(view, &request, request.query(), |facts| {
                cross_module(request.range, &request.modules, facts)
            })
            .await)
    }

    /// Bucketed history of one concept
    pub async fn concept_evolution(&self, params: &EvolutionParams) -> ViewOutcome<ConceptEvolution> {
        let view = ViewKind::Evolution;
        let request = self.validate(view, params.resolve(self.clock.now(), &self.config))?;

        let key = (&request, &self.config.evolution);
        Ok(self
            .serve(view, &key, request.query(), |facts| {
                evolve(
                    &request.concept,
                    request.granularity,
                    request.range,
                    &request.buckets,
                    facts,
                    &self.config.evolution,
                )
            })
            .await)
    }

    /// Side-by-side comparison of two modules
    pub async fn compare_modules(&self, params: &ComparisonParams) -> ViewOutcome<ModuleComparison> {
        let view = ViewKind::Comparison;
        let request = self.validate(view, params.resolve(self.clock.now()))?;

        Ok(self
            .serve(view, &request, request.query(), |facts| {
                compare(request.range, &request.module_a, &request.module_b, facts)
            })
            .await)
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Outcome of the last graph call and the last cache call
    pub fn health(&self) -> HealthReport {
        HealthReport::new(
            self.graph_health.snapshot(),
            self.cache.health(),
            self.cache.stats().hit_rate(),
        )
    }

    /// Probe the cache first, then report
    pub async fn check_health(&self) -> HealthReport {
        self.cache.is_available().await;
        self.health()
    }

    // =========================================================================
    // Shared pipeline
    // =========================================================================

    fn validate<T>(
        &self,
        view: ViewKind,
        result: Result<T, InvalidParameters>,
    ) -> Result<T, InvalidParameters> {
        if let Err(e) = &result {
            metrics::record_invalid_request(view.as_str());
            tracing::debug!(view = %view, error = %e, "Rejected view request");
        }
        result
    }

    async fn serve<K, T, F>(
        &self,
        view: ViewKind,
        key_input: &K,
        query: OccurrenceQuery,
        aggregate: F,
    ) -> ViewResult<T>
    where
        K: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce(&[ConceptOccurrence]) -> T,
    {
        let started = Instant::now();

        let key = match CacheGateway::fingerprint(key_input) {
            Ok(fingerprint) => Some(self.cache.view_key(view.as_str(), &fingerprint)),
            Err(e) => {
                tracing::warn!(view = %view, error = %e, "Cannot derive cache key, bypassing cache");
                None
            }
        };

        if let Some(key) = &key {
            if let Some(cached) = self.cache.get::<T>(key).await {
                tracing::debug!(view = %view, key = %key, "Cache hit");
                metrics::record_view(view.as_str(), "hit", started.elapsed().as_secs_f64());
                return ViewResult::ok(view, cached, true);
            }
            tracing::debug!(view = %view, key = %key, "Cache miss");
        }

        let facts = match self.fetch(&query).await {
            Ok(facts) => facts,
            Err(e) => {
                tracing::warn!(
                    view = %view,
                    source = self.source.name(),
                    error = %e,
                    "Graph fetch failed, returning degraded view"
                );
                metrics::record_view(view.as_str(), "degraded", started.elapsed().as_secs_f64());
                return ViewResult::degraded(view, e.to_string());
            }
        };

        let data = aggregate(&facts);

        if let Some(key) = &key {
            self.cache.set(key, &data, self.config.ttl_for(view)).await;
        }

        tracing::debug!(
            view = %view,
            facts = facts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "View computed"
        );
        metrics::record_view(view.as_str(), "miss", started.elapsed().as_secs_f64());
        ViewResult::ok(view, data, false)
    }

    /// One bounded graph call; every failure is recorded against graph health
    async fn fetch(&self, query: &OccurrenceQuery) -> Result<Vec<ConceptOccurrence>, GraphError> {
        let timeout = self.config.graph_timeout();

        let result = match tokio::time::timeout(timeout, self.source.fetch_occurrences(query)).await {
            Ok(result) => result,
            Err(_) => Err(GraphError::Timeout(timeout)),
        };

        let result = result.and_then(|facts| {
            match facts.iter().find_map(|fact| query.defect(fact)) {
                Some(defect) => Err(GraphError::MalformedData(defect)),
                None => Ok(facts),
            }
        });

        match &result {
            Ok(_) => self.graph_health.record_success(),
            Err(e) => {
                self.graph_health.record_failure(e);
                metrics::record_graph_error(e.kind());
            }
        }
        result
    }
}
