//! Time ranges, relative windows and calendar buckets
//!
//! Every analytic view is scoped by a [`TimeWindow`], which is either an
//! absolute half-open [`TimeRange`] or a relative "last N units" window.
//! Relative windows are resolved against a [`Clock`] to bucket-aligned
//! absolute bounds, so two requests made inside the same bucket resolve to
//! the same range.
//!
//! Bucket units:
//! - `day` - calendar day (UTC midnight)
//! - `week` - ISO week starting on Monday
//! - `month` - calendar month
//! - `semester` - half year: S1 starts January 1st, S2 starts July 1st

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidParameters;

/// Half-open interval `[start, end)` over UTC timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,

    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range, rejecting `start >= end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidParameters> {
        if start >= end {
            return Err(InvalidParameters::InvertedTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Check whether a timestamp falls inside the range
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Length of the range
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The window of equal length ending where this one starts
    pub fn preceding(&self) -> Option<Self> {
        let start = self.start.checked_sub_signed(self.duration())?;
        Some(Self {
            start,
            end: self.start,
        })
    }

    /// Smallest range covering both `self` and `other`
    #[must_use]
    pub fn hull(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Calendar unit for relative windows and evolution buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowUnit {
    Day,
    Week,
    Month,
    Semester,
}

impl WindowUnit {
    /// Get string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Semester => "semester",
        }
    }

    /// Start of the bucket containing `timestamp`
    pub fn bucket_start(self, timestamp: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let date = timestamp.date_naive();
        match self {
            Self::Day => midnight(date),
            Self::Week => {
                let offset = i64::from(date.weekday().num_days_from_monday());
                midnight(date.checked_sub_signed(Duration::days(offset))?)
            }
            Self::Month => month_start(date.year(), i64::from(date.month0())),
            Self::Semester => {
                let month0 = if date.month0() < 6 { 0 } else { 6 };
                month_start(date.year(), month0)
            }
        }
    }

    /// Move a bucket start `steps` buckets forward (or backward when negative)
    pub fn advance(self, bucket_start: DateTime<Utc>, steps: i64) -> Option<DateTime<Utc>> {
        match self {
            Self::Day => bucket_start.checked_add_signed(Duration::days(steps)),
            Self::Week => bucket_start.checked_add_signed(Duration::weeks(steps)),
            Self::Month => month_start(
                bucket_start.year(),
                i64::from(bucket_start.month0()) + steps,
            ),
            Self::Semester => month_start(
                bucket_start.year(),
                i64::from(bucket_start.month0()) + steps.checked_mul(6)?,
            ),
        }
    }

    /// Number of buckets from the bucket starting at `from` to the one starting at `to`
    fn steps_between(self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        let days = i64::from(to.num_days_from_ce()) - i64::from(from.num_days_from_ce());
        let months = |t: DateTime<Utc>| i64::from(t.year()) * 12 + i64::from(t.month0());
        match self {
            Self::Day => days,
            Self::Week => days / 7,
            Self::Month => months(to) - months(from),
            Self::Semester => months(to) / 6 - months(from) / 6,
        }
    }

    /// Human-readable bucket label, e.g. `2024-W11` or `2024-S1`
    #[must_use]
    pub fn label(self, bucket_start: DateTime<Utc>) -> String {
        match self {
            Self::Day => bucket_start.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let iso = bucket_start.iso_week();
                format!("{}-W{:02}", iso.year(), iso.week())
            }
            Self::Month => bucket_start.format("%Y-%m").to_string(),
            Self::Semester => {
                let half = if bucket_start.month0() < 6 { 1 } else { 2 };
                format!("{}-S{half}", bucket_start.year())
            }
        }
    }
}

impl fmt::Display for WindowUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" | "d" => Ok(Self::Day),
            "week" | "weeks" | "w" => Ok(Self::Week),
            "month" | "months" | "m" => Ok(Self::Month),
            "semester" | "semesters" | "s" => Ok(Self::Semester),
            other => Err(format!("unknown window unit: {other}")),
        }
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// First instant of the month `month0` months after January of `year`
fn month_start(year: i32, month0: i64) -> Option<DateTime<Utc>> {
    let total = i64::from(year).checked_mul(12)?.checked_add(month0)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12) + 1).ok()?;
    midnight(NaiveDate::from_ymd_opt(year, month, 1)?)
}

/// One aligned bucket clipped to the requested range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket bounds, clipped to the enclosing range
    pub range: TimeRange,

    /// Label of the aligned bucket
    pub label: String,
}

/// Split `range` into the aligned `unit` buckets it intersects
///
/// The first and last buckets are clipped to `range`. Fails when more than
/// `max_buckets` buckets would be produced.
pub fn buckets(
    range: &TimeRange,
    unit: WindowUnit,
    max_buckets: usize,
) -> Result<Vec<Bucket>, InvalidParameters> {
    let first = unit
        .bucket_start(range.start)
        .ok_or(InvalidParameters::TimeOutOfRange)?;
    let last = range
        .end
        .checked_sub_signed(Duration::nanoseconds(1))
        .and_then(|t| unit.bucket_start(t))
        .ok_or(InvalidParameters::TimeOutOfRange)?;

    let count = usize::try_from(unit.steps_between(first, last))
        .map_or(usize::MAX, |steps| steps.saturating_add(1));
    if count > max_buckets {
        return Err(InvalidParameters::TooManyBuckets {
            buckets: count,
            max: max_buckets,
        });
    }

    let mut out = Vec::with_capacity(count);
    let mut cursor = first;
    while cursor < range.end {
        let next = unit
            .advance(cursor, 1)
            .ok_or(InvalidParameters::TimeOutOfRange)?;
        out.push(Bucket {
            range: TimeRange {
                start: cursor.max(range.start),
                end: next.min(range.end),
            },
            label: unit.label(cursor),
        });
        cursor = next;
    }

    Ok(out)
}

/// Scope of an analytic view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeWindow {
    /// Explicit half-open bounds
    Absolute {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The current bucket plus the `amount - 1` buckets before it
    Relative { amount: u32, unit: WindowUnit },
}

impl TimeWindow {
    /// Absolute window from explicit bounds
    #[must_use]
    pub fn absolute(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::Absolute { start, end }
    }

    /// Relative "last N units" window
    #[must_use]
    pub fn last(amount: u32, unit: WindowUnit) -> Self {
        Self::Relative { amount, unit }
    }

    /// Shorthand for `last N semesters`
    #[must_use]
    pub fn last_semesters(amount: u32) -> Self {
        Self::last(amount, WindowUnit::Semester)
    }

    /// Resolve to absolute bounds
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<TimeRange, InvalidParameters> {
        match *self {
            Self::Absolute { start, end } => TimeRange::new(start, end),
            Self::Relative { amount, unit } => {
                if amount == 0 {
                    return Err(InvalidParameters::EmptyWindow {
                        unit: unit.as_str(),
                    });
                }
                let current = unit
                    .bucket_start(now)
                    .ok_or(InvalidParameters::TimeOutOfRange)?;
                let end = unit
                    .advance(current, 1)
                    .ok_or(InvalidParameters::TimeOutOfRange)?;
                let start = unit
                    .advance(current, -(i64::from(amount) - 1))
                    .ok_or(InvalidParameters::TimeOutOfRange)?;
                TimeRange::new(start, end)
            }
        }
    }
}

impl From<TimeRange> for TimeWindow {
    fn from(range: TimeRange) -> Self {
        Self::Absolute {
            start: range.start,
            end: range.end,
        }
    }
}

/// Source of "now" for resolving relative windows
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
