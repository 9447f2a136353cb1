//! Request parameters for each view and their canonical form
//!
//! Callers build a `*Params` value; the analyzer validates it against the
//! current clock and configuration, producing a resolved request with
//! absolute bounds, sorted and deduplicated module lists and a concrete
//! limit. The resolved request is what the cache key is derived from, so
//! two requests meaning the same thing share one cache entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::error::InvalidParameters;
use crate::graph::OccurrenceQuery;
use crate::time::{buckets, Bucket, TimeRange, TimeWindow, WindowUnit};

/// Trim identifiers, reject blanks, then sort and dedupe
fn canonical_ids(field: &'static str, ids: &[String]) -> Result<Vec<String>, InvalidParameters> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if id.is_empty() {
            return Err(InvalidParameters::EmptyIdentifier { field });
        }
        out.push(id.to_string());
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn canonical_id(field: &'static str, id: &str) -> Result<String, InvalidParameters> {
    let id = id.trim();
    if id.is_empty() {
        return Err(InvalidParameters::EmptyIdentifier { field });
    }
    Ok(id.to_string())
}

fn resolve_limit(limit: Option<usize>, config: &AnalyticsConfig) -> Result<usize, InvalidParameters> {
    match limit {
        None => Ok(config.default_limit.min(config.max_limit)),
        Some(limit) if limit == 0 || limit > config.max_limit => {
            Err(InvalidParameters::LimitOutOfBounds {
                limit,
                max: config.max_limit,
            })
        }
        Some(limit) => Ok(limit),
    }
}

// ============================================================================
// Listing views (frequency, trending, emerging)
// ============================================================================

/// Parameters shared by the ranked listing views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingParams {
    pub window: TimeWindow,
    /// Restrict to these modules; empty means every module
    #[serde(default)]
    pub modules: Vec<String>,
    /// Restrict to these concepts; empty means every concept
    #[serde(default)]
    pub concepts: Vec<String>,
    /// Maximum entries in the listing; `None` uses the configured default
    #[serde(default)]
    pub limit: Option<usize>,
}

pub type FrequencyParams = ListingParams;
pub type TrendingParams = ListingParams;
pub type EmergingParams = ListingParams;

impl ListingParams {
    #[must_use]
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            modules: Vec::new(),
            concepts: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn with_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules = modules.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_concepts<I, S>(mut self, concepts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.concepts = concepts.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validate and resolve against `now`
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        config: &AnalyticsConfig,
    ) -> Result<ListingRequest, InvalidParameters> {
        Ok(ListingRequest {
            range: self.window.resolve(now)?,
            modules: canonical_ids("modules", &self.modules)?,
            concepts: canonical_ids("concepts", &self.concepts)?,
            limit: resolve_limit(self.limit, config)?,
        })
    }
}

/// Canonical listing request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRequest {
    pub range: TimeRange,
    pub modules: Vec<String>,
    pub concepts: Vec<String>,
    pub limit: usize,
}

impl ListingRequest {
    /// Occurrences needed for a single-window listing
    #[must_use]
    pub fn query(&self) -> OccurrenceQuery {
        OccurrenceQuery::in_range(self.range)
            .with_modules(self.modules.clone())
            .with_concepts(self.concepts.clone())
    }

    /// The window of equal length before `range`
    pub fn prior_range(&self) -> Result<TimeRange, InvalidParameters> {
        self.range.preceding().ok_or(InvalidParameters::TimeOutOfRange)
    }

    /// Occurrences needed to compare `range` with its prior window
    pub fn comparison_query(&self) -> Result<OccurrenceQuery, InvalidParameters> {
        let hull = self.prior_range()?.hull(&self.range);
        Ok(OccurrenceQuery::in_range(hull)
            .with_modules(self.modules.clone())
            .with_concepts(self.concepts.clone()))
    }
}

// ============================================================================
// Cross-module analysis
// ============================================================================

/// Overlap across two or more modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossModuleParams {
    pub window: TimeWindow,
    pub modules: Vec<String>,
}

impl CrossModuleParams {
    #[must_use]
    pub fn new<I, S>(window: TimeWindow, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            window,
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> Result<CrossModuleRequest, InvalidParameters> {
        if self.modules.is_empty() {
            return Err(InvalidParameters::MissingFilter("modules"));
        }
        let modules = canonical_ids("modules", &self.modules)?;
        if modules.len() < 2 {
            return Err(InvalidParameters::TooFewModules {
                required: 2,
                got: modules.len(),
            });
        }
        Ok(CrossModuleRequest {
            range: self.window.resolve(now)?,
            modules,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossModuleRequest {
    pub range: TimeRange,
    pub modules: Vec<String>,
}

impl CrossModuleRequest {
    #[must_use]
    pub fn query(&self) -> OccurrenceQuery {
        OccurrenceQuery::in_range(self.range).with_modules(self.modules.clone())
    }
}

// ============================================================================
// Concept evolution
// ============================================================================

/// Bucketed history of one concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionParams {
    pub concept: String,
    pub window: TimeWindow,
    pub granularity: WindowUnit,
    #[serde(default)]
    pub modules: Vec<String>,
}

impl EvolutionParams {
    #[must_use]
    pub fn new(concept: impl Into<String>, window: TimeWindow, granularity: WindowUnit) -> Self {
        Self {
            concept: concept.into(),
            window,
            granularity,
            modules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules = modules.into_iter().map(Into::into).collect();
        self
    }

    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        config: &AnalyticsConfig,
    ) -> Result<EvolutionRequest, InvalidParameters> {
        let concept = canonical_id("concept", &self.concept)?;
        let range = self.window.resolve(now)?;
        let buckets = buckets(&range, self.granularity, config.max_buckets)?;
        Ok(EvolutionRequest {
            concept,
            range,
            granularity: self.granularity,
            modules: canonical_ids("modules", &self.modules)?,
            buckets,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionRequest {
    pub concept: String,
    pub range: TimeRange,
    pub granularity: WindowUnit,
    pub modules: Vec<String>,
    /// Derived from `range` and `granularity`
    #[serde(skip)]
    pub buckets: Vec<Bucket>,
}

impl EvolutionRequest {
    /// Every concept in range is fetched so bucket shares can be computed
    #[must_use]
    pub fn query(&self) -> OccurrenceQuery {
        OccurrenceQuery::in_range(self.range).with_modules(self.modules.clone())
    }
}

// ============================================================================
// Module comparison
// ============================================================================

/// Side-by-side comparison of exactly two modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonParams {
    pub module_a: String,
    pub module_b: String,
    pub window: TimeWindow,
}

impl ComparisonParams {
    #[must_use]
    pub fn new(module_a: impl Into<String>, module_b: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            module_a: module_a.into(),
            module_b: module_b.into(),
            window,
        }
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> Result<ComparisonRequest, InvalidParameters> {
        let module_a = canonical_id("module_a", &self.module_a)?;
        let module_b = canonical_id("module_b", &self.module_b)?;
        if module_a == module_b {
            return Err(InvalidParameters::IdenticalModules(module_a));
        }
        Ok(ComparisonRequest {
            range: self.window.resolve(now)?,
            module_a,
            module_b,
        })
    }
}

/// Module order is kept; `only_in_a` / `only_in_b` depend on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRequest {
    pub range: TimeRange,
    pub module_a: String,
    pub module_b: String,
}

impl ComparisonRequest {
    #[must_use]
    pub fn query(&self) -> OccurrenceQuery {
        OccurrenceQuery::in_range(self.range)
            .with_modules(vec![self.module_a.clone(), self.module_b.clone()])
    }
}
