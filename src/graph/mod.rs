//! Graph query facade
//!
//! The analyzer never talks to a graph database directly. It asks an
//! [`OccurrenceSource`] for the concept-occurrence facts matching an
//! [`OccurrenceQuery`] and aggregates them itself. The knowledge graph is
//! read-only from this crate's perspective.
//!
//! - [`InMemoryGraph`] - occurrence facts held in process, loadable from JSON

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::error::{ErrorCategory, ScopeErrorTrait};
use crate::models::ConceptOccurrence;
use crate::time::TimeRange;

pub use memory::InMemoryGraph;

/// Errors reported by a graph backend
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    #[error("Graph backend unreachable: {0}")]
    Unreachable(String),

    #[error("Graph query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Graph query failed: {0}")]
    Query(String),

    #[error("Graph returned malformed data: {0}")]
    MalformedData(String),
}

impl GraphError {
    /// Short label used for metrics and health reporting
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "unreachable",
            Self::Timeout(_) => "timeout",
            Self::Query(_) => "query",
            Self::MalformedData(_) => "malformed",
        }
    }
}

impl ScopeErrorTrait for GraphError {
    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MalformedData(_))
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::BackendUnavailable
    }
}

/// Filter for an occurrence fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceQuery {
    /// Only occurrences with `range.start <= timestamp < range.end`
    pub range: TimeRange,

    /// Restrict to these modules (`None` = all modules)
    pub modules: Option<Vec<String>>,

    /// Restrict to these concepts (`None` = all concepts)
    pub concepts: Option<Vec<String>>,
}

impl OccurrenceQuery {
    /// Query every occurrence in a range
    #[must_use]
    pub fn in_range(range: TimeRange) -> Self {
        Self {
            range,
            modules: None,
            concepts: None,
        }
    }

    /// Restrict to modules; an empty list means no restriction
    #[must_use]
    pub fn with_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = (!modules.is_empty()).then_some(modules);
        self
    }

    /// Restrict to concepts; an empty list means no restriction
    #[must_use]
    pub fn with_concepts(mut self, concepts: Vec<String>) -> Self {
        self.concepts = (!concepts.is_empty()).then_some(concepts);
        self
    }

    /// Check whether an occurrence satisfies every filter
    #[must_use]
    pub fn matches(&self, occurrence: &ConceptOccurrence) -> bool {
        self.defect(occurrence).is_none()
    }

    /// Describe why an occurrence does not answer this query
    pub fn defect(&self, occurrence: &ConceptOccurrence) -> Option<String> {
        if let Some(reason) = occurrence.defect(&self.range, self.modules.as_deref()) {
            return Some(reason);
        }
        match &self.concepts {
            Some(concepts) if !concepts.iter().any(|c| c == &occurrence.concept) => Some(
                format!("occurrence of unrequested concept {}", occurrence.concept),
            ),
            _ => None,
        }
    }
}

/// Capability to fetch concept occurrences from the knowledge graph
///
/// Implementations return an unordered sequence; callers must not rely on
/// any ordering. Timeouts are applied by the caller.
#[async_trait]
pub trait OccurrenceSource: Send + Sync {
    /// Fetch all occurrences matching `query`
    async fn fetch_occurrences(
        &self,
        query: &OccurrenceQuery,
    ) -> Result<Vec<ConceptOccurrence>, GraphError>;

    /// Backend name for logs
    fn name(&self) -> &str {
        "graph"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn query() -> OccurrenceQuery {
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();
        OccurrenceQuery::in_range(range)
    }

    #[test]
    fn test_empty_filters_mean_unrestricted() {
        let q = query().with_modules(vec![]).with_concepts(vec![]);
        assert!(q.modules.is_none());
        assert!(q.concepts.is_none());
    }

    #[test]
    fn test_concept_filter() {
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let q = query().with_concepts(vec!["heap".into()]);
        assert!(q.matches(&ConceptOccurrence::new("heap", "CS201", at)));
        assert!(!q.matches(&ConceptOccurrence::new("stack", "CS201", at)));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(GraphError::Timeout(Duration::from_secs(1)).kind(), "timeout");
        assert!(!GraphError::MalformedData("x".into()).is_recoverable());
        assert!(GraphError::Unreachable("down".into()).is_recoverable());
    }
}
