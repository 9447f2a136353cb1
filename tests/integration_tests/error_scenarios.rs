//! Error scenario integration tests
//!
//! Tests various failure modes and error handling:
//! 1. Graph unreachable
//! 2. Graph timeouts
//! 3. Malformed facts from the graph
//! 4. Cache backend down (fail-open)
//! 5. Invalid parameters

use std::sync::Arc;

use conceptscope::analytics::{
    ComparisonParams, CrossModuleParams, EvolutionParams, FrequencyParams, TrendingParams,
    ViewStatus,
};
use conceptscope::cache::CacheGateway;
use conceptscope::error::InvalidParameters;
use conceptscope::health::HealthStatus;
use conceptscope::time::{TimeWindow, WindowUnit};

use crate::common::{self, ts, DownBackend, SloppyGraph, StalledGraph};

fn this_week() -> TimeWindow {
    TimeWindow::last(1, WindowUnit::Week)
}

fn memory_cache() -> Arc<CacheGateway> {
    Arc::new(CacheGateway::in_memory(&common::cache_config()))
}

// ============================================================================
// Graph Failure Tests
// ============================================================================

#[tokio::test]
async fn test_unreachable_graph_degrades() {
    let (analyzer, graph) = common::sample_analyzer();
    graph.set_offline(true);

    let result = analyzer
        .concept_frequencies(&FrequencyParams::new(this_week()))
        .await
        .expect("Degraded views are not errors");

    assert!(result.is_degraded());
    assert!(result.data.is_none());
    assert!(!result.served_from_cache);
    match &result.status {
        ViewStatus::Degraded { reason } => assert!(reason.contains("unreachable")),
        ViewStatus::Ok => panic!("Expected degraded status"),
    }

    let health = analyzer.health();
    assert_eq!(health.graph.last_call_ok, Some(false));
    assert_eq!(health.status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_degraded_result_is_not_cached() {
    let (analyzer, graph) = common::sample_analyzer();
    let params = FrequencyParams::new(this_week());

    graph.set_offline(true);
    assert!(analyzer.concept_frequencies(&params).await.unwrap().is_degraded());

    graph.set_offline(false);
    let recovered = analyzer.concept_frequencies(&params).await.unwrap();
    assert!(!recovered.is_degraded());
    assert!(!recovered.served_from_cache);
    assert_eq!(analyzer.health().graph.last_call_ok, Some(true));
}

#[tokio::test]
async fn test_cached_view_survives_graph_outage() {
    let (analyzer, graph) = common::sample_analyzer();
    let params = TrendingParams::new(this_week());

    let fresh = analyzer.trending_concepts(&params).await.unwrap();
    graph.set_offline(true);
    let cached = analyzer.trending_concepts(&params).await.unwrap();

    assert!(cached.served_from_cache);
    assert_eq!(fresh.data, cached.data);
    assert_eq!(graph.calls(), 1);
}

#[tokio::test]
async fn test_graph_timeout_degrades() {
    let analyzer = common::analyzer(Arc::new(StalledGraph), memory_cache());

    let result = analyzer
        .cross_module_analysis(&CrossModuleParams::new(this_week(), ["CS101", "CS202"]))
        .await
        .unwrap();

    assert!(result.is_degraded());
    match &result.status {
        ViewStatus::Degraded { reason } => assert!(reason.contains("timed out")),
        ViewStatus::Ok => panic!("Expected degraded status"),
    }
}

#[tokio::test]
async fn test_out_of_range_facts_are_malformed() {
    // A fact from last year, returned for a this-week query
    let facts = vec![common::occ("graphs", "CS101", ts(2023, 3, 12, 9))];
    let analyzer = common::analyzer(Arc::new(SloppyGraph(facts)), memory_cache());

    let result = analyzer
        .concept_frequencies(&FrequencyParams::new(this_week()))
        .await
        .unwrap();

    assert!(result.is_degraded());
    assert_eq!(analyzer.health().graph.last_call_ok, Some(false));
}

#[tokio::test]
async fn test_unrequested_module_is_malformed() {
    let facts = vec![common::occ("graphs", "MA101", ts(2024, 3, 12, 9))];
    let analyzer = common::analyzer(Arc::new(SloppyGraph(facts)), memory_cache());

    let result = analyzer
        .compare_modules(&ComparisonParams::new("CS101", "CS202", this_week()))
        .await
        .unwrap();
    assert!(result.is_degraded());
}

// ============================================================================
// Cache Failure Tests
// ============================================================================

#[tokio::test]
async fn test_cache_down_fails_open() {
    let graph = Arc::new(common::CountingGraph::new(common::sample_facts()));
    let cache = Arc::new(CacheGateway::new(Arc::new(DownBackend), &common::cache_config()));
    let analyzer = common::analyzer(graph.clone(), cache);
    let params = FrequencyParams::new(this_week());

    let first = analyzer.concept_frequencies(&params).await.unwrap();
    let second = analyzer.concept_frequencies(&params).await.unwrap();

    assert!(!first.is_degraded());
    assert!(!second.served_from_cache);
    assert_eq!(first.data, second.data);
    assert_eq!(graph.calls(), 2);

    let health = analyzer.check_health().await;
    assert_eq!(health.cache.last_call_ok, Some(false));
    assert_eq!(health.graph.last_call_ok, Some(true));
    assert_eq!(health.status, HealthStatus::Degraded);
}

// ============================================================================
// Invalid Parameter Tests
// ============================================================================

#[tokio::test]
async fn test_invalid_parameters_fail_before_io() {
    let (analyzer, graph) = common::sample_analyzer();

    let inverted = FrequencyParams::new(TimeWindow::absolute(ts(2024, 3, 2, 0), ts(2024, 3, 1, 0)));
    assert!(matches!(
        analyzer.concept_frequencies(&inverted).await,
        Err(InvalidParameters::InvertedTimeRange { .. })
    ));

    let too_many = FrequencyParams::new(this_week()).with_limit(10_000);
    assert!(matches!(
        analyzer.concept_frequencies(&too_many).await,
        Err(InvalidParameters::LimitOutOfBounds { .. })
    ));

    let one_module = CrossModuleParams::new(this_week(), ["CS101"]);
    assert!(matches!(
        analyzer.cross_module_analysis(&one_module).await,
        Err(InvalidParameters::TooFewModules { .. })
    ));

    let same = ComparisonParams::new("CS101", "CS101", this_week());
    assert!(matches!(
        analyzer.compare_modules(&same).await,
        Err(InvalidParameters::IdenticalModules(_))
    ));

    let daily_for_years = EvolutionParams::new(
        "graphs",
        TimeWindow::absolute(ts(2020, 1, 1, 0), ts(2024, 1, 1, 0)),
        WindowUnit::Day,
    );
    assert!(matches!(
        analyzer.concept_evolution(&daily_for_years).await,
        Err(InvalidParameters::TooManyBuckets { .. })
    ));

    assert_eq!(graph.calls(), 0);
    assert_eq!(analyzer.health().graph.last_call_ok, None);
}
