// Core data structures shared by the graph facade and the analyzer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::TimeRange;

fn default_weight() -> u32 {
    1
}

/// A concept observed in a module at a point in time
///
/// Produced by the graph facade; the analyzer only reads and aggregates
/// these facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptOccurrence {
    pub concept: String,
    pub module: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl ConceptOccurrence {
    /// Create an occurrence with weight 1
    pub fn new(
        concept: impl Into<String>,
        module: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            concept: concept.into(),
            module: module.into(),
            timestamp,
            weight: 1,
        }
    }

    /// Set the occurrence weight
    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Describe why this fact does not belong to a query's answer, if it doesn't
    pub fn defect(&self, range: &TimeRange, modules: Option<&[String]>) -> Option<String> {
        if self.concept.trim().is_empty() {
            return Some("occurrence with empty concept id".to_string());
        }
        if self.module.trim().is_empty() {
            return Some(format!("occurrence of {} with empty module id", self.concept));
        }
        if !range.contains(self.timestamp) {
            return Some(format!(
                "occurrence of {} at {} outside {range}",
                self.concept, self.timestamp
            ));
        }
        if let Some(modules) = modules {
            if !modules.iter().any(|m| m == &self.module) {
                return Some(format!(
                    "occurrence of {} in unrequested module {}",
                    self.concept, self.module
                ));
            }
        }
        None
    }
}
