//! Tests for models and time windows

use chrono::{DateTime, TimeZone, Utc};

use conceptscope::analytics::{ViewKind, ViewResult};
use conceptscope::error::InvalidParameters;
use conceptscope::time::{buckets, TimeRange, TimeWindow, WindowUnit};
use conceptscope::ConceptOccurrence;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    at(y, m, d, 0, 0)
}

fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeRange {
    TimeRange::new(start, end).unwrap()
}

// ============================================================================
// Occurrences
// ============================================================================

#[test]
fn test_occurrence_json_defaults_weight() {
    let json = r#"[
        {"concept": "graphs", "module": "CS101", "timestamp": "2024-03-12T09:00:00Z"},
        {"concept": "trees", "module": "CS101", "timestamp": "2024-03-12T09:00:00Z", "weight": 4}
    ]"#;
    let facts: Vec<ConceptOccurrence> = serde_json::from_str(json).unwrap();

    assert_eq!(facts[0].weight, 1);
    assert_eq!(facts[1].weight, 4);
    assert_eq!(facts[0].timestamp, at(2024, 3, 12, 9, 0));
}

#[test]
fn test_occurrence_outside_range_has_defect() {
    let window = range(day(2024, 3, 11), day(2024, 3, 18));
    let inside = ConceptOccurrence::new("graphs", "CS101", day(2024, 3, 11));
    let at_end = ConceptOccurrence::new("graphs", "CS101", day(2024, 3, 18));

    assert!(inside.defect(&window, None).is_none());
    assert!(at_end.defect(&window, None).is_some());
}

// ============================================================================
// Relative windows
// ============================================================================

#[test]
fn test_relative_windows_are_bucket_aligned() {
    let now = at(2024, 3, 15, 12, 0);

    let weeks = TimeWindow::last(2, WindowUnit::Week).resolve(now).unwrap();
    assert_eq!(weeks, range(day(2024, 3, 4), day(2024, 3, 18)));

    let months = TimeWindow::last(3, WindowUnit::Month).resolve(now).unwrap();
    assert_eq!(months, range(day(2024, 1, 1), day(2024, 4, 1)));

    let semesters = TimeWindow::last_semesters(2).resolve(now).unwrap();
    assert_eq!(semesters, range(day(2023, 7, 1), day(2024, 7, 1)));
}

#[test]
fn test_same_bucket_resolves_to_same_range() {
    let window = TimeWindow::last(1, WindowUnit::Week);
    let monday = window.resolve(day(2024, 3, 11)).unwrap();
    let sunday = window.resolve(at(2024, 3, 17, 23, 59)).unwrap();
    assert_eq!(monday, sunday);
}

#[test]
fn test_empty_and_inverted_windows_are_rejected() {
    let now = at(2024, 3, 15, 12, 0);

    assert!(matches!(
        TimeWindow::last(0, WindowUnit::Month).resolve(now),
        Err(InvalidParameters::EmptyWindow { unit: "month" })
    ));
    assert!(matches!(
        TimeWindow::absolute(now, now).resolve(now),
        Err(InvalidParameters::InvertedTimeRange { .. })
    ));
}

#[test]
fn test_window_json_shape() {
    let window: TimeWindow =
        serde_json::from_str(r#"{"type": "relative", "amount": 2, "unit": "semester"}"#).unwrap();
    assert_eq!(window, TimeWindow::last_semesters(2));

    let window: TimeWindow = serde_json::from_str(
        r#"{"type": "absolute", "start": "2024-01-01T00:00:00Z", "end": "2024-02-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(window, TimeWindow::absolute(day(2024, 1, 1), day(2024, 2, 1)));
}

#[test]
fn test_window_unit_parsing() {
    assert_eq!("Weeks".parse::<WindowUnit>(), Ok(WindowUnit::Week));
    assert_eq!("s".parse::<WindowUnit>(), Ok(WindowUnit::Semester));
    assert!("fortnight".parse::<WindowUnit>().is_err());
}

// ============================================================================
// Buckets
// ============================================================================

#[test]
fn test_month_buckets_are_clipped() {
    let out = buckets(&range(day(2024, 3, 13), day(2024, 4, 10)), WindowUnit::Month, 10).unwrap();

    let labels: Vec<_> = out.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["2024-03", "2024-04"]);
    assert_eq!(out[0].range.start, day(2024, 3, 13));
    assert_eq!(out[0].range.end, day(2024, 4, 1));
    assert_eq!(out[1].range.end, day(2024, 4, 10));
}

#[test]
fn test_semester_labels() {
    let out = buckets(&range(day(2023, 1, 1), day(2024, 7, 1)), WindowUnit::Semester, 10).unwrap();
    let labels: Vec<_> = out.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["2023-S1", "2023-S2", "2024-S1"]);
}

#[test]
fn test_week_labels_use_iso_year() {
    let out = buckets(&range(day(2024, 12, 23), day(2025, 1, 6)), WindowUnit::Week, 10).unwrap();
    let labels: Vec<_> = out.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["2024-W52", "2025-W01"]);
}

#[test]
fn test_too_many_buckets_reports_count() {
    let err = buckets(&range(day(2024, 1, 1), day(2024, 1, 11)), WindowUnit::Day, 3).unwrap_err();
    assert_eq!(err, InvalidParameters::TooManyBuckets { buckets: 10, max: 3 });
}

// ============================================================================
// Result envelope
// ============================================================================

#[test]
fn test_degraded_result_json() {
    let result: ViewResult<Vec<String>> = ViewResult::degraded(ViewKind::CrossModule, "timed out");
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["view"], "cross_module");
    assert_eq!(json["status"]["state"], "degraded");
    assert_eq!(json["status"]["reason"], "timed out");
    assert!(json["data"].is_null());
    assert_eq!(json["served_from_cache"], false);
}

#[test]
fn test_ok_result_json() {
    let result = ViewResult::ok(ViewKind::Frequency, vec!["graphs".to_string()], true);
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["status"]["state"], "ok");
    assert_eq!(json["data"][0], "graphs");
    assert_eq!(json["served_from_cache"], true);
}
