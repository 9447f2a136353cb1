//! Integration tests module
//!
//! End-to-end tests for the trend analyzer:
//! - Every view over a shared course history
//! - Cache hits, misses and fail-open behavior
//! - Graph failures turning into degraded views

pub mod error_scenarios;
pub mod fixtures;
pub mod views_test;
