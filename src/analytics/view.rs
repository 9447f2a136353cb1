//! View identities and the tagged result every view returns

use serde::{Deserialize, Serialize};
use std::fmt;

/// The analytic views served by [`super::TrendAnalyzer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Frequency,
    Trending,
    Emerging,
    CrossModule,
    Evolution,
    Comparison,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::Frequency,
        ViewKind::Trending,
        ViewKind::Emerging,
        ViewKind::CrossModule,
        ViewKind::Evolution,
        ViewKind::Comparison,
    ];

    /// Name used in cache keys, metrics and logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Frequency => "frequency",
            ViewKind::Trending => "trending",
            ViewKind::Emerging => "emerging",
            ViewKind::CrossModule => "cross_module",
            ViewKind::Evolution => "evolution",
            ViewKind::Comparison => "comparison",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a view carries data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ViewStatus {
    Ok,
    /// The graph could not answer; no payload is attached
    Degraded { reason: String },
}

/// Outcome of one view request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResult<T> {
    pub view: ViewKind,
    pub status: ViewStatus,
    pub served_from_cache: bool,
    pub data: Option<T>,
}

impl<T> ViewResult<T> {
    #[must_use]
    pub fn ok(view: ViewKind, data: T, served_from_cache: bool) -> Self {
        Self {
            view,
            status: ViewStatus::Ok,
            served_from_cache,
            data: Some(data),
        }
    }

    #[must_use]
    pub fn degraded(view: ViewKind, reason: impl Into<String>) -> Self {
        Self {
            view,
            status: ViewStatus::Degraded {
                reason: reason.into(),
            },
            served_from_cache: false,
            data: None,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ViewStatus::Degraded { .. })
    }

    /// Payload, if the view was computed or served from cache
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
