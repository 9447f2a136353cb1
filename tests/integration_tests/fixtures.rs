//! Test fixtures for integration tests
//!
//! Provides sample facts files and helper functions for testing

/// Facts file as produced by a graph export
pub const SAMPLE_FACTS_JSON: &str = r#"[
  {"concept": "graphs", "module": "CS101", "timestamp": "2024-03-12T09:00:00Z", "weight": 3},
  {"concept": "trees", "module": "CS101", "timestamp": "2024-03-14T09:00:00Z"},
  {"concept": "trees", "module": "CS202", "timestamp": "2024-03-14T10:00:00Z"},
  {"concept": "hashing", "module": "CS202", "timestamp": "2024-03-11T09:00:00Z", "weight": 2}
]"#;

/// Not an array of occurrences
pub const MALFORMED_FACTS_JSON: &str = r#"{"concept": "graphs"}"#;

/// Write `content` to a fresh temporary file
pub fn write_facts(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write facts");
    file
}
