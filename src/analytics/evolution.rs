//! Concept evolution with trend direction and spike detection
//!
//! This module provides functionality for:
//! - Bucketing one concept's occurrences by day, week, month or semester
//! - Computing each bucket's share of all concept activity
//! - Computing trend direction and velocity
//! - Identifying spikes against a moving average

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EvolutionConfig;
use crate::models::ConceptOccurrence;
use crate::time::{Bucket, TimeRange, WindowUnit};
use crate::utils::ratio;

/// Trend direction indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Strongly increasing
    Rising,

    /// Slightly increasing
    SlightlyRising,

    /// Stable, no significant change
    Stable,

    /// Slightly decreasing
    SlightlyFalling,

    /// Strongly decreasing
    Falling,
}

impl TrendDirection {
    /// Determine trend direction from velocity
    ///
    /// # Arguments
    /// * `velocity` - Rate of change (-1.0 to 1.0)
    ///
    /// # Classification
    /// - `velocity > 0.3`: Rising
    /// - `0.1 < velocity <= 0.3`: SlightlyRising
    /// - `-0.1 <= velocity <= 0.1`: Stable
    /// - `-0.3 <= velocity < -0.1`: SlightlyFalling
    /// - `velocity < -0.3`: Falling
    #[must_use]
    pub fn from_velocity(velocity: f64) -> Self {
        if velocity > 0.3 {
            Self::Rising
        } else if velocity > 0.1 {
            Self::SlightlyRising
        } else if velocity >= -0.1 {
            Self::Stable
        } else if velocity >= -0.3 {
            Self::SlightlyFalling
        } else {
            Self::Falling
        }
    }
}

/// One bucket of a concept's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionPoint {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Weighted count of the concept in this bucket
    pub count: u64,
    /// Concept count / count of every concept in this bucket
    pub share: f64,
}

/// Spike detection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    /// Bucket the spike occurred in
    pub label: String,

    /// Actual count at spike
    pub count: u64,

    /// Expected count (moving average)
    pub expected: f64,

    /// Spike magnitude (count / expected)
    pub magnitude: f64,

    /// Z-score of the spike
    pub z_score: f64,
}

/// Chronological history of one concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptEvolution {
    pub concept: String,
    pub granularity: WindowUnit,
    pub range: TimeRange,
    /// One point per bucket, zero-count buckets included
    pub points: Vec<EvolutionPoint>,
    pub total_count: u64,
    /// Normalized least-squares slope in [-1.0, 1.0]
    pub velocity: f64,
    pub direction: TrendDirection,
    pub spikes: Vec<Spike>,
}

/// Build the evolution of `concept` over `buckets`
///
/// `occurrences` should cover every concept in range so shares are
/// meaningful; occurrences outside every bucket are ignored.
#[must_use]
pub fn evolve(
    concept: &str,
    granularity: WindowUnit,
    range: TimeRange,
    buckets: &[Bucket],
    occurrences: &[ConceptOccurrence],
    config: &EvolutionConfig,
) -> ConceptEvolution {
    let mut concept_counts = vec![0u64; buckets.len()];
    let mut bucket_totals = vec![0u64; buckets.len()];

    for occurrence in occurrences {
        // Buckets are contiguous and ordered, so a binary search finds the slot
        let idx = buckets.partition_point(|b| b.range.end <= occurrence.timestamp);
        let Some(bucket) = buckets.get(idx) else {
            continue;
        };
        if !bucket.range.contains(occurrence.timestamp) {
            continue;
        }
        let weight = u64::from(occurrence.weight);
        bucket_totals[idx] += weight;
        if occurrence.concept == concept {
            concept_counts[idx] += weight;
        }
    }

    let points: Vec<EvolutionPoint> = buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| EvolutionPoint {
            label: bucket.label.clone(),
            start: bucket.range.start,
            end: bucket.range.end,
            count: concept_counts[i],
            share: ratio(concept_counts[i], bucket_totals[i]),
        })
        .collect();

    let velocity = velocity(&concept_counts);

    ConceptEvolution {
        concept: concept.to_string(),
        granularity,
        range,
        total_count: concept_counts.iter().sum(),
        velocity,
        direction: TrendDirection::from_velocity(velocity),
        spikes: detect_spikes(&points, config),
        points,
    }
}

/// Linear regression slope over the series, normalized by its mean
///
/// Fewer than two points, or an all-zero series, has velocity 0.0.
#[must_use]
pub fn velocity(counts: &[u64]) -> f64 {
    if counts.len() < 2 {
        return 0.0;
    }

    let points: Vec<(f64, f64)> = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| (i as f64, c as f64))
        .collect();

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);

    // Normalize velocity to [-1.0, 1.0] based on mean
    let mean = sum_y / n;
    if mean > 0.0 {
        (slope / mean).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Detect buckets whose count is at least `spike_threshold` times the
/// moving average over the trailing `spike_window` buckets (inclusive)
///
/// Series shorter than the window have no spikes.
#[must_use]
pub fn detect_spikes(points: &[EvolutionPoint], config: &EvolutionConfig) -> Vec<Spike> {
    let window = config.spike_window.max(1);
    if points.len() < window {
        return Vec::new();
    }

    // Calculate mean and standard deviation for z-scores
    let counts: Vec<f64> = points.iter().map(|p| p.count as f64).collect();
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    let variance = counts.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    let std_dev = variance.sqrt();

    let mut spikes = Vec::new();
    for (i, point) in points.iter().enumerate() {
        let start = i.saturating_sub(window - 1);
        let expected = counts[start..=i].iter().sum::<f64>() / (i - start + 1) as f64;
        if expected <= 0.0 {
            continue;
        }

        let magnitude = point.count as f64 / expected;
        if magnitude >= config.spike_threshold {
            let z_score = if std_dev > 0.0 {
                (point.count as f64 - mean) / std_dev
            } else {
                0.0
            };

            spikes.push(Spike {
                label: point.label.clone(),
                count: point.count,
                expected,
                magnitude,
                z_score,
            });
        }
    }

    spikes
}
