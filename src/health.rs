//! Health tracking for the graph and cache backends
//!
//! The analyzer records the outcome of every graph call and the cache
//! gateway records the outcome of every cache call. A [`HealthReport`]
//! built from both is what an external health endpoint aggregates.
//!
//! Recording is lock-free except for the last error message, whose mutex
//! is never held across I/O.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};
use std::sync::Mutex;

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

const STATE_UNKNOWN: u8 = 0;
const STATE_OK: u8 = 1;
const STATE_FAILED: u8 = 2;

/// Outcome of the most recent call to one backend
#[derive(Debug)]
pub struct ComponentHealth {
    name: &'static str,
    state: AtomicU8,
    last_checked_ms: AtomicI64,
    last_error: Mutex<Option<String>>,
}

impl ComponentHealth {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: AtomicU8::new(STATE_UNKNOWN),
            last_checked_ms: AtomicI64::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        self.state.store(STATE_OK, Ordering::SeqCst);
        self.touch();
    }

    /// Record a failed call
    pub fn record_failure(&self, error: impl ToString) {
        self.state.store(STATE_FAILED, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = Some(error.to_string());
        }
        self.touch();
    }

    fn touch(&self) {
        self.last_checked_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
    }

    /// `None` until the first call has been recorded
    #[must_use]
    pub fn last_call_ok(&self) -> Option<bool> {
        match self.state.load(Ordering::SeqCst) {
            STATE_OK => Some(true),
            STATE_FAILED => Some(false),
            _ => None,
        }
    }

    /// Point-in-time copy for reporting
    #[must_use]
    pub fn snapshot(&self) -> ComponentSnapshot {
        let last_call_ok = self.last_call_ok();
        let millis = self.last_checked_ms.load(Ordering::SeqCst);
        let last_checked = if millis == 0 {
            None
        } else {
            Utc.timestamp_millis_opt(millis).single()
        };
        let last_error = if last_call_ok == Some(false) {
            self.last_error.lock().ok().and_then(|guard| guard.clone())
        } else {
            None
        };

        ComponentSnapshot {
            name: self.name.to_string(),
            last_call_ok,
            last_checked,
            last_error,
        }
    }
}

/// Serializable view of a [`ComponentHealth`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSnapshot {
    pub name: String,
    pub last_call_ok: Option<bool>,
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Combined health of the analytics core
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub graph: ComponentSnapshot,
    pub cache: ComponentSnapshot,
    pub cache_hit_rate: f64,
}

impl HealthReport {
    /// A failing graph makes the core unhealthy; a failing cache only degrades it
    #[must_use]
    pub fn new(graph: ComponentSnapshot, cache: ComponentSnapshot, cache_hit_rate: f64) -> Self {
        let status = if graph.last_call_ok == Some(false) {
            HealthStatus::Unhealthy
        } else if cache.last_call_ok == Some(false) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            graph,
            cache,
            cache_hit_rate,
        }
    }
}
