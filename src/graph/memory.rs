//! In-memory occurrence source
//!
//! Holds occurrence facts in a `tokio::sync::RwLock` so it can be shared
//! between concurrent view computations. Used by the CLI (facts loaded
//! from a JSON file) and by tests, where it can also simulate an
//! unreachable backend.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{GraphError, OccurrenceQuery, OccurrenceSource};
use crate::error::{Error, Result};
use crate::models::ConceptOccurrence;

/// Occurrence facts held in process
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    occurrences: RwLock<Vec<ConceptOccurrence>>,
    offline: AtomicBool,
}

impl InMemoryGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph holding `occurrences`
    #[must_use]
    pub fn with_occurrences(occurrences: Vec<ConceptOccurrence>) -> Self {
        Self {
            occurrences: RwLock::new(occurrences),
            offline: AtomicBool::new(false),
        }
    }

    /// Load facts from a JSON array of occurrences
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::with_source(format!("Failed to read facts file: {}", path.display()), e)
        })?;
        let occurrences: Vec<ConceptOccurrence> = serde_json::from_str(&content)?;

        tracing::info!(
            path = %path.display(),
            occurrences = occurrences.len(),
            "Loaded occurrence facts"
        );

        Ok(Self::with_occurrences(occurrences))
    }

    /// Append facts
    pub async fn extend(&self, occurrences: impl IntoIterator<Item = ConceptOccurrence>) {
        self.occurrences.write().await.extend(occurrences);
    }

    /// Number of stored facts
    pub async fn len(&self) -> usize {
        self.occurrences.read().await.len()
    }

    /// Check if no facts are stored
    pub async fn is_empty(&self) -> bool {
        self.occurrences.read().await.is_empty()
    }

    /// Simulate the backend going down (or coming back)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl OccurrenceSource for InMemoryGraph {
    async fn fetch_occurrences(
        &self,
        query: &OccurrenceQuery,
    ) -> std::result::Result<Vec<ConceptOccurrence>, GraphError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GraphError::Unreachable("in-memory graph is offline".into()));
        }

        let guard = self.occurrences.read().await;
        Ok(guard.iter().filter(|o| query.matches(o)).cloned().collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
