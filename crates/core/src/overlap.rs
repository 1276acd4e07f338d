//! Interval overlap rules for calendar slots.
//!
//! A slot occupies the half-open range `[start, end)`. Two ranges conflict
//! when any of three predicates holds for the existing range relative to the
//! new one: it starts inside the new range, it ends inside the new range, or
//! it fully spans the new range. The same predicates are expressed in SQL by
//! the slot repository; keep the two in sync.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Length of the range. Negative when `end < start`.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Whether `existing` conflicts with `self` under the three overlap predicates.
    pub fn conflicts_with(&self, existing: &TimeRange) -> bool {
        let contains_start = existing.start >= self.start && existing.start < self.end;
        let contains_end = existing.end > self.start && existing.end <= self.end;
        let fully_spans = existing.start <= self.start && existing.end >= self.end;
        contains_start || contains_end || fully_spans
    }
}

/// An existing slot that blocks a create request. Reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotConflict {
    pub id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Find the first pair of ranges in a batch that conflict with each other.
///
/// Returns the indices (into the input slice) of the two ranges, or `None`
/// when the batch is internally consistent.
pub fn find_self_overlap(ranges: &[TimeRange]) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..ranges.len()).collect();
    order.sort_by_key(|&i| ranges[i].start);

    // Sweep keeping the range that reaches furthest so far.
    let mut furthest: Option<usize> = None;
    for &i in &order {
        if let Some(prev) = furthest {
            if ranges[i].conflicts_with(&ranges[prev]) {
                return Some((prev, i));
            }
            if ranges[i].end > ranges[prev].end {
                furthest = Some(i);
            }
        } else {
            furthest = Some(i);
        }
    }
    None
}
