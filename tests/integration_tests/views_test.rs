//! View pipeline integration tests
//!
//! Every view is computed over the shared course history in
//! `common::sample_facts`, with relative windows resolved against a fixed
//! clock (Friday 2024-03-15).

use std::sync::Arc;

use conceptscope::analytics::{
    ComparisonParams, CrossModuleParams, EmergingParams, EvolutionParams, FrequencyParams,
    TrendDirection, TrendingParams, ViewKind,
};
use conceptscope::cache::CacheGateway;
use conceptscope::graph::InMemoryGraph;
use conceptscope::time::{TimeWindow, WindowUnit};

use super::fixtures::{write_facts, MALFORMED_FACTS_JSON, SAMPLE_FACTS_JSON};
use crate::common::{self, ts};

fn this_week() -> TimeWindow {
    TimeWindow::last(1, WindowUnit::Week)
}

// ============================================================================
// Frequency
// ============================================================================

#[tokio::test]
async fn test_frequency_distribution() {
    let (analyzer, _) = common::sample_analyzer();

    let result = analyzer
        .concept_frequencies(&FrequencyParams::new(this_week()))
        .await
        .unwrap();
    assert_eq!(result.view, ViewKind::Frequency);
    assert!(!result.is_degraded());

    let report = result.into_data().unwrap();
    assert_eq!(report.range.start, ts(2024, 3, 11, 0));
    assert_eq!(report.range.end, ts(2024, 3, 18, 0));
    assert_eq!(report.total_occurrences, 16);

    let ranking: Vec<_> = report
        .concepts
        .iter()
        .map(|c| (c.concept.as_str(), c.count, c.rank))
        .collect();
    assert_eq!(
        ranking,
        vec![
            ("graphs", 5, 1),
            ("trees", 5, 2),
            ("hashing", 3, 3),
            ("recursion", 3, 4),
        ]
    );

    let share_sum: f64 = report.concepts.iter().map(|c| c.share).sum();
    assert!((share_sum - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_frequency_concept_filter() {
    let (analyzer, _) = common::sample_analyzer();

    let params = FrequencyParams::new(this_week()).with_concepts(["hashing", "graphs"]);
    let report = analyzer
        .concept_frequencies(&params)
        .await
        .unwrap()
        .into_data()
        .unwrap();

    let ranking: Vec<_> = report
        .concepts
        .iter()
        .map(|c| (c.concept.as_str(), c.count))
        .collect();
    assert_eq!(ranking, vec![("graphs", 5), ("hashing", 3)]);
    assert_eq!(report.total_occurrences, 8);
}

#[tokio::test]
async fn test_frequency_module_filter_and_limit() {
    let (analyzer, _) = common::sample_analyzer();

    let params = FrequencyParams::new(this_week())
        .with_modules(["CS202"])
        .with_limit(1);
    let report = analyzer
        .concept_frequencies(&params)
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(report.total_concepts, 2);
    assert_eq!(report.concepts.len(), 1);
    assert_eq!(report.concepts[0].concept, "hashing");
}

#[tokio::test]
async fn test_empty_window_has_empty_distribution() {
    let (analyzer, _) = common::sample_analyzer();

    let params = FrequencyParams::new(TimeWindow::absolute(ts(2023, 1, 1, 0), ts(2023, 2, 1, 0)));
    let report = analyzer
        .concept_frequencies(&params)
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(report.total_occurrences, 0);
    assert!(report.concepts.is_empty());
}

// ============================================================================
// Trending / emerging
// ============================================================================

#[tokio::test]
async fn test_trending_and_emerging_are_exclusive() {
    let (analyzer, _) = common::sample_analyzer();

    let trending = analyzer
        .trending_concepts(&TrendingParams::new(this_week()))
        .await
        .unwrap()
        .into_data()
        .unwrap();
    let emerging = analyzer
        .emerging_concepts(&EmergingParams::new(this_week()))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    let trending_names: Vec<_> = trending.concepts.iter().map(|c| c.concept.as_str()).collect();
    let emerging_names: Vec<_> = emerging.concepts.iter().map(|c| c.concept.as_str()).collect();

    assert_eq!(trending_names, vec!["hashing", "graphs"]);
    assert_eq!(emerging_names, vec!["recursion"]);
    assert!(trending_names.iter().all(|t| !emerging_names.contains(t)));

    assert_eq!(trending.prior_range.start, ts(2024, 3, 4, 0));
    assert_eq!(trending.prior_range.end, trending.range.start);

    let recursion = &emerging.concepts[0];
    assert_eq!(recursion.first_seen, ts(2024, 3, 15, 8));
    assert_eq!(recursion.growth_rate, None);
}

// ============================================================================
// Cross-module / comparison
// ============================================================================

#[tokio::test]
async fn test_cross_module_is_symmetric() {
    let (analyzer, graph) = common::sample_analyzer();

    let ab = analyzer
        .cross_module_analysis(&CrossModuleParams::new(this_week(), ["CS101", "CS202"]))
        .await
        .unwrap();
    let ba = analyzer
        .cross_module_analysis(&CrossModuleParams::new(this_week(), ["CS202", "CS101"]))
        .await
        .unwrap();

    // Same canonical request, so the second call is a cache hit
    assert!(ba.served_from_cache);
    assert_eq!(graph.calls(), 1);
    assert_eq!(ab.data, ba.data);

    let analysis = ab.into_data().unwrap();
    assert_eq!(analysis.shared_concepts, vec!["graphs"]);
    assert_eq!(analysis.concept_modules["graphs"], vec!["CS101", "CS202"]);
    assert!((analysis.overlap_score - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_compare_modules() {
    let (analyzer, _) = common::sample_analyzer();

    let comparison = analyzer
        .compare_modules(&ComparisonParams::new("CS101", "CS202", this_week()))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(comparison.only_in_a, vec!["recursion", "trees"]);
    assert_eq!(comparison.only_in_b, vec!["hashing"]);
    assert_eq!(comparison.shared, vec!["graphs"]);
    assert!((comparison.similarity - 0.25).abs() < 1e-9);

    let reversed = analyzer
        .compare_modules(&ComparisonParams::new("CS202", "CS101", this_week()))
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(reversed.only_in_a, comparison.only_in_b);
    assert_eq!(reversed.similarity, comparison.similarity);
}

// ============================================================================
// Evolution
// ============================================================================

#[tokio::test]
async fn test_concept_evolution_by_week() {
    let (analyzer, _) = common::sample_analyzer();

    let params = EvolutionParams::new("graphs", TimeWindow::last(3, WindowUnit::Week), WindowUnit::Week);
    let evolution = analyzer
        .concept_evolution(&params)
        .await
        .unwrap()
        .into_data()
        .unwrap();

    let points: Vec<_> = evolution
        .points
        .iter()
        .map(|p| (p.label.as_str(), p.count))
        .collect();
    assert_eq!(points, vec![("2024-W09", 0), ("2024-W10", 2), ("2024-W11", 5)]);
    assert_eq!(evolution.total_count, 7);
    assert_eq!(evolution.points[0].share, 0.0);
    assert!((evolution.points[2].share - 5.0 / 16.0).abs() < 1e-9);
    assert_eq!(evolution.direction, TrendDirection::Rising);
}

// ============================================================================
// Cache behavior
// ============================================================================

#[tokio::test]
async fn test_repeated_request_is_idempotent_and_cached() {
    let (analyzer, graph) = common::sample_analyzer();
    let params = FrequencyParams::new(this_week());

    let first = analyzer.concept_frequencies(&params).await.unwrap();
    let second = analyzer.concept_frequencies(&params).await.unwrap();

    assert!(!first.served_from_cache);
    assert!(second.served_from_cache);
    assert_eq!(first.data, second.data);
    assert_eq!(graph.calls(), 1);
    assert_eq!(analyzer.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_cached_shares_match_computed_shares() {
    let mut facts = common::repeat("graphs", "CS101", ts(2024, 3, 12, 9), 1);
    facts.extend(common::repeat("trees", "CS101", ts(2024, 3, 12, 9), 10));
    let graph = Arc::new(common::CountingGraph::new(facts));
    let cache = Arc::new(CacheGateway::in_memory(&common::cache_config()));
    let analyzer = common::analyzer(graph.clone(), cache);
    let params = FrequencyParams::new(this_week());

    let first = analyzer.concept_frequencies(&params).await.unwrap();
    let second = analyzer.concept_frequencies(&params).await.unwrap();

    assert!(second.served_from_cache);
    assert_eq!(graph.calls(), 1);
    assert_eq!(first.data, second.data);
}

#[tokio::test]
async fn test_views_do_not_share_cache_entries() {
    let (analyzer, graph) = common::sample_analyzer();

    analyzer
        .trending_concepts(&TrendingParams::new(this_week()))
        .await
        .unwrap();
    let emerging = analyzer
        .emerging_concepts(&EmergingParams::new(this_week()))
        .await
        .unwrap();

    assert!(!emerging.served_from_cache);
    assert_eq!(graph.calls(), 2);
}

#[tokio::test]
async fn test_uncached_analyzer_always_fetches() {
    let graph = Arc::new(common::CountingGraph::new(common::sample_facts()));
    let cache = Arc::new(CacheGateway::disabled(&common::cache_config()));
    let analyzer = common::analyzer(graph.clone(), cache);
    let params = FrequencyParams::new(this_week());

    let first = analyzer.concept_frequencies(&params).await.unwrap();
    let second = analyzer.concept_frequencies(&params).await.unwrap();

    assert_eq!(first.data, second.data);
    assert!(!second.served_from_cache);
    assert_eq!(graph.calls(), 2);
}

// ============================================================================
// Facts files
// ============================================================================

#[tokio::test]
async fn test_facts_file_round_trip() {
    let file = write_facts(SAMPLE_FACTS_JSON);
    let graph = Arc::new(InMemoryGraph::from_json_file(file.path()).await.unwrap());
    let cache = Arc::new(CacheGateway::in_memory(&common::cache_config()));
    let analyzer = common::analyzer(graph, cache);

    let report = analyzer
        .concept_frequencies(&FrequencyParams::new(this_week()))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    // Missing weights default to 1
    let counts: Vec<_> = report.concepts.iter().map(|c| (c.concept.as_str(), c.count)).collect();
    assert_eq!(counts, vec![("graphs", 3), ("hashing", 2), ("trees", 2)]);
}

#[tokio::test]
async fn test_malformed_facts_file_is_rejected() {
    let file = write_facts(MALFORMED_FACTS_JSON);
    assert!(InMemoryGraph::from_json_file(file.path()).await.is_err());
}
