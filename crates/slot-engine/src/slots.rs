//! Tile open windows into fixed-length candidate slots.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::config::SlotPolicy;
use crate::interval::TimeInterval;

/// A bookable span plus the buffered block used for isolation checks.
///
/// `block_start`/`block_end` are never offered to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub block_start: DateTime<Utc>,
    pub block_end: DateTime<Utc>,
}

impl CandidateSlot {
    /// The unbuffered span a caller books.
    pub fn span(&self) -> Option<TimeInterval> {
        TimeInterval::new(self.start, self.end)
    }

    /// The buffered span tested against busy time.
    pub fn block(&self) -> Option<TimeInterval> {
        TimeInterval::new(self.block_start, self.block_end)
    }
}

fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(instant)
}

/// Generate candidate slots inside each window.
///
/// Each window is tiled independently from its start (truncated to the
/// minute) in steps of the slot length; a slot never crosses a window's end.
/// Slots starting before `now + min_notice` are dropped. The buffer only sets
/// the block bounds and does not change spacing.
pub fn generate(windows: &[TimeInterval], policy: &SlotPolicy, now: DateTime<Utc>) -> Vec<CandidateSlot> {
    if policy.slot_minutes == 0 {
        return Vec::new();
    }

    let slot = policy.slot();
    let buffer = policy.buffer();
    let earliest = now + policy.min_notice();

    let mut slots = Vec::new();
    for window in windows {
        let mut cursor = truncate_to_minute(window.start());
        while cursor + slot <= window.end() {
            let end = cursor + slot;
            if cursor >= earliest {
                slots.push(CandidateSlot {
                    start: cursor,
                    end,
                    block_start: cursor - buffer,
                    block_end: end + buffer,
                });
            }
            cursor = end;
        }
    }

    slots
}
