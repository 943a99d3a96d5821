//! Half-open time ranges used for query windows and transmission spans.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected interval construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Interval end {end} is before start {start}")]
pub struct InvertedInterval {
    /// Requested start instant
    pub start: DateTime<Utc>,
    /// Requested end instant
    pub end: DateTime<Utc>,
}

/// Half-open `[start, end)` time range.
///
/// Zero-length intervals are legal and describe follow-on markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for Interval {
    type Error = InvertedInterval;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Interval::new(raw.start, raw.end)
    }
}

impl Interval {
    /// Creates interval from `start` (inclusive) to `end` (exclusive).
    ///
    /// # Errors
    /// - `InvertedInterval` - `end` is before `start`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvertedInterval> {
        if end < start {
            return Err(InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a zero-length interval at `instant`.
    pub fn instant(instant: DateTime<Utc>) -> Self {
        Self {
            start: instant,
            end: instant,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Checks whether `instant` falls inside `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Checks whether both intervals share at least one instant.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Smallest interval covering both `self` and `other`.
    pub fn spanning(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
