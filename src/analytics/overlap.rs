//! Cross-module overlap and two-module comparison
//!
//! A concept is "in" a module when its weighted count there is non-zero.
//! Every result here depends only on the set of modules, not their order,
//! except for the `only_in_a` / `only_in_b` split of [`ModuleComparison`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::ConceptOccurrence;
use crate::time::TimeRange;
use crate::utils::ratio;

/// Jaccard overlap between one pair of modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOverlap {
    pub module_a: String,
    pub module_b: String,
    pub shared: usize,
    pub jaccard: f64,
}

/// Concept overlap across a set of modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossModuleAnalysis {
    pub range: TimeRange,
    /// Requested modules, sorted
    pub modules: Vec<String>,
    /// Concept → modules it appears in (sorted)
    pub concept_modules: BTreeMap<String, Vec<String>>,
    /// Concepts present in two or more modules
    pub shared_concepts: Vec<String>,
    /// Concepts present in every module / all concepts
    pub overlap_score: f64,
    /// One entry per unordered module pair
    pub pairwise: Vec<ModuleOverlap>,
}

/// Exactly-two-module comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleComparison {
    pub range: TimeRange,
    pub module_a: String,
    pub module_b: String,
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
    pub shared: Vec<String>,
    /// Jaccard similarity of the concept sets
    pub similarity: f64,
    /// Cosine similarity of the weighted concept counts
    pub weighted_similarity: f64,
}

/// `|a ∩ b| / |a ∪ b|`, or 0.0 when both sets are empty
#[must_use]
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let shared = a.intersection(b).count() as u64;
    let union = (a.len() + b.len()) as u64 - shared;
    ratio(shared, union)
}

/// Cosine similarity of two count vectors keyed by concept
#[must_use]
pub fn cosine(a: &BTreeMap<String, u64>, b: &BTreeMap<String, u64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(k, x)| b.get(k).map(|y| *x as f64 * *y as f64))
        .sum();
    let norm = |v: &BTreeMap<String, u64>| v.values().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

/// Weighted concept counts per module; modules without occurrences map to empty
fn counts_by_module(
    modules: &[String],
    occurrences: &[ConceptOccurrence],
) -> BTreeMap<String, BTreeMap<String, u64>> {
    let mut out: BTreeMap<String, BTreeMap<String, u64>> =
        modules.iter().map(|m| (m.clone(), BTreeMap::new())).collect();

    for occurrence in occurrences {
        if occurrence.weight == 0 {
            continue;
        }
        if let Some(counts) = out.get_mut(&occurrence.module) {
            *counts.entry(occurrence.concept.clone()).or_default() += u64::from(occurrence.weight);
        }
    }
    out
}

fn concept_set(counts: &BTreeMap<String, u64>) -> BTreeSet<String> {
    counts.keys().cloned().collect()
}

/// Overlap analysis for `modules` (expected sorted and distinct)
#[must_use]
pub fn cross_module(
    range: TimeRange,
    modules: &[String],
    occurrences: &[ConceptOccurrence],
) -> CrossModuleAnalysis {
    let counts = counts_by_module(modules, occurrences);
    let sets: BTreeMap<&String, BTreeSet<String>> =
        counts.iter().map(|(m, c)| (m, concept_set(c))).collect();

    let mut concept_modules: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (module, concepts) in &sets {
        for concept in concepts {
            concept_modules
                .entry(concept.clone())
                .or_default()
                .push((*module).clone());
        }
    }

    let shared_concepts: Vec<String> = concept_modules
        .iter()
        .filter(|(_, ms)| ms.len() >= 2)
        .map(|(c, _)| c.clone())
        .collect();

    let in_every_module = concept_modules
        .values()
        .filter(|ms| ms.len() == sets.len())
        .count() as u64;
    let overlap_score = ratio(in_every_module, concept_modules.len() as u64);

    let ordered: Vec<(&String, &BTreeSet<String>)> = sets.iter().map(|(m, s)| (*m, s)).collect();
    let mut pairwise = Vec::new();
    for (i, (module_a, set_a)) in ordered.iter().enumerate() {
        for (module_b, set_b) in &ordered[i + 1..] {
            pairwise.push(ModuleOverlap {
                module_a: (*module_a).clone(),
                module_b: (*module_b).clone(),
                shared: set_a.intersection(*set_b).count(),
                jaccard: jaccard(*set_a, *set_b),
            });
        }
    }

    CrossModuleAnalysis {
        range,
        modules: sets.keys().map(|m| (*m).clone()).collect(),
        concept_modules,
        shared_concepts,
        overlap_score,
        pairwise,
    }
}

/// Compare `module_a` with `module_b`
#[must_use]
pub fn compare(
    range: TimeRange,
    module_a: &str,
    module_b: &str,
    occurrences: &[ConceptOccurrence],
) -> ModuleComparison {
    let mut counts = counts_by_module(&[module_a.to_string(), module_b.to_string()], occurrences);
    let counts_a = counts.remove(module_a).unwrap_or_default();
    let counts_b = counts.remove(module_b).unwrap_or_default();
    let (set_a, set_b) = (concept_set(&counts_a), concept_set(&counts_b));

    ModuleComparison {
        range,
        module_a: module_a.to_string(),
        module_b: module_b.to_string(),
        only_in_a: set_a.difference(&set_b).cloned().collect(),
        only_in_b: set_b.difference(&set_a).cloned().collect(),
        shared: set_a.intersection(&set_b).cloned().collect(),
        similarity: jaccard(&set_a, &set_b),
        weighted_similarity: cosine(&counts_a, &counts_b),
    }
}
