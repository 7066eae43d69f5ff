//! Half-open time intervals over UTC instants.
//!
//! Every busy period, slot and generated entry in this crate is a
//! [`TimeInterval`]. Construction enforces `end > start`, so an empty or
//! inverted interval can never reach the assignment loop. Adjacent intervals
//! (one ends exactly when the other starts) do NOT overlap.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShiftError};

/// A half-open range `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Unchecked wire shape; promoted to [`TimeInterval`] through [`TimeInterval::new`].
#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = ShiftError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        TimeInterval::new(raw.start, raw.end)
    }
}

impl TimeInterval {
    /// Build an interval, rejecting `end <= start` with
    /// [`ShiftError::InvalidInterval`].
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(ShiftError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the interval. Always strictly positive.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Two intervals overlap iff `self.start < other.end && other.start < self.end`.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The intersection of the two intervals, if they overlap.
    pub fn overlap_with(&self, other: &TimeInterval) -> Option<TimeInterval> {
        if !self.overlaps(other) {
            return None;
        }
        Some(TimeInterval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// True when `other` starts exactly where `self` ends.
    pub fn is_adjacent_to(&self, other: &TimeInterval) -> bool {
        self.end == other.start
    }
}

/// Fold chronologically adjacent intervals into single runs.
///
/// The input is sorted by start first. Two intervals merge only when one's end
/// equals the next one's start exactly; gaps and overlaps are left alone.
/// Applying this to its own output is a no-op.
pub fn merge_adjacent(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            if last.is_adjacent_to(&interval) {
                last.end = interval.end;
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}
