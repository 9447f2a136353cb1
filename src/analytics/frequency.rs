//! Concept frequency distribution over one range

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::ConceptOccurrence;
use crate::time::TimeRange;
use crate::utils::ratio;

/// One concept's place in a frequency distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptFrequency {
    pub concept: String,
    /// Sum of occurrence weights
    pub count: u64,
    /// `count / total`
    pub share: f64,
    /// 1-based, ties broken by concept id ascending
    pub rank: usize,
}

/// Ranked distribution of concepts in a range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyReport {
    pub range: TimeRange,
    /// Total weight across all concepts, before `limit`
    pub total_occurrences: u64,
    /// Distinct concepts, before `limit`
    pub total_concepts: usize,
    pub concepts: Vec<ConceptFrequency>,
}

/// Weighted count per concept, skipping concepts whose weight sums to zero
pub fn count_by_concept<'a, I>(occurrences: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = &'a ConceptOccurrence>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for occurrence in occurrences {
        *counts.entry(occurrence.concept.clone()).or_default() += u64::from(occurrence.weight);
    }
    counts.retain(|_, count| *count > 0);
    counts
}

/// Rank counts by descending count, then concept id ascending
///
/// Shares are computed against the full total, so they sum to 1.0 over
/// the returned list.
#[must_use]
pub fn rank(counts: BTreeMap<String, u64>) -> Vec<ConceptFrequency> {
    let total: u64 = counts.values().sum();

    // BTreeMap iteration is already concept-ascending; a stable sort keeps it
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (concept, count))| ConceptFrequency {
            concept,
            count,
            share: ratio(count, total),
            rank: i + 1,
        })
        .collect()
}

/// Frequency report for `occurrences`, listing at most `limit` concepts
#[must_use]
pub fn frequency_report(
    range: TimeRange,
    occurrences: &[ConceptOccurrence],
    limit: usize,
) -> FrequencyReport {
    let counts = count_by_concept(occurrences);
    let total_occurrences = counts.values().sum();
    let total_concepts = counts.len();

    let mut concepts = rank(counts);
    concepts.truncate(limit);

    FrequencyReport {
        range,
        total_occurrences,
        total_concepts,
        concepts,
    }
}
