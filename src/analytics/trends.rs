//! Trending and emerging concepts
//!
//! Both views compare a concept's weighted count in the requested window
//! against the immediately preceding window of equal length.
//!
//! Emergence is evaluated first, so a concept is never both:
//! - **emerging**: rare in the prior window (`prior <= rare_prior_max`),
//!   present at least `min_current_count` times now, and either new or
//!   grown by at least `min_growth_rate`
//! - **trending**: not emerging, already present in the prior window, and
//!   grown by at least `min_relative_growth` and `min_absolute_growth`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::{EmergenceConfig, TrendingConfig};
use crate::models::ConceptOccurrence;
use crate::time::TimeRange;
use crate::utils::ratio;

/// A concept growing against its prior window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingConcept {
    pub concept: String,
    pub count: u64,
    /// Share of the current window's total weight
    pub share: f64,
    pub prior_count: u64,
    pub absolute_growth: i64,
    /// `(count - prior_count) / prior_count`
    pub relative_growth: f64,
}

/// A concept newly appearing, or rising from near-absence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergingConcept {
    pub concept: String,
    pub count: u64,
    pub share: f64,
    pub prior_count: u64,
    /// Earliest occurrence inside the current window
    pub first_seen: DateTime<Utc>,
    /// `None` when the prior count is zero
    pub growth_rate: Option<f64>,
}

/// Trending concepts for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingReport {
    pub range: TimeRange,
    pub prior_range: TimeRange,
    pub concepts: Vec<TrendingConcept>,
}

/// Emerging concepts for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergingReport {
    pub range: TimeRange,
    pub prior_range: TimeRange,
    pub concepts: Vec<EmergingConcept>,
}

/// Both classifications, fully ordered and untruncated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub trending: Vec<TrendingConcept>,
    pub emerging: Vec<EmergingConcept>,
}

#[derive(Debug, Default)]
struct Tally {
    current: u64,
    prior: u64,
    first_seen: Option<DateTime<Utc>>,
}

/// Classify every concept seen in `current`
///
/// Occurrences outside both windows are ignored.
#[must_use]
pub fn classify(
    current: &TimeRange,
    prior: &TimeRange,
    occurrences: &[ConceptOccurrence],
    emergence: &EmergenceConfig,
    trending: &TrendingConfig,
) -> Classification {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for occurrence in occurrences {
        let weight = u64::from(occurrence.weight);
        if current.contains(occurrence.timestamp) {
            let tally = tallies.entry(occurrence.concept.as_str()).or_default();
            tally.current += weight;
            if weight > 0 {
                tally.first_seen = Some(match tally.first_seen {
                    Some(seen) => seen.min(occurrence.timestamp),
                    None => occurrence.timestamp,
                });
            }
        } else if prior.contains(occurrence.timestamp) {
            tallies.entry(occurrence.concept.as_str()).or_default().prior += weight;
        }
    }

    let total: u64 = tallies.values().map(|t| t.current).sum();
    let mut out = Classification::default();

    for (concept, tally) in tallies {
        let Some(first_seen) = tally.first_seen else {
            continue;
        };
        let (count, prior_count) = (tally.current, tally.prior);
        let growth = (prior_count > 0).then(|| (count as f64 - prior_count as f64) / prior_count as f64);

        let is_emerging = prior_count <= emergence.rare_prior_max
            && count >= emergence.min_current_count
            && growth.map_or(true, |g| g >= emergence.min_growth_rate);

        if is_emerging {
            out.emerging.push(EmergingConcept {
                concept: concept.to_string(),
                count,
                share: ratio(count, total),
                prior_count,
                first_seen,
                growth_rate: growth,
            });
            continue;
        }

        let Some(relative_growth) = growth else {
            continue;
        };
        let absolute_growth = count as i64 - prior_count as i64;
        if relative_growth >= trending.min_relative_growth
            && absolute_growth >= trending.min_absolute_growth as i64
        {
            out.trending.push(TrendingConcept {
                concept: concept.to_string(),
                count,
                share: ratio(count, total),
                prior_count,
                absolute_growth,
                relative_growth,
            });
        }
    }

    out.trending.sort_by(|a, b| {
        b.relative_growth
            .partial_cmp(&a.relative_growth)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.absolute_growth.cmp(&a.absolute_growth))
            .then_with(|| a.concept.cmp(&b.concept))
    });
    out.emerging
        .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.concept.cmp(&b.concept)));

    out
}
