//! Availability filtering and the caller-facing offer shapes.
//!
//! A candidate survives only if its *buffered* block stays clear of every
//! busy interval. Using the block rather than the bare slot keeps a gap of at
//! least the buffer between a new booking and any existing one.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::SchedulingConfig;
use crate::error::{BookingError, Result};
use crate::interval::{self, RawEvent, TimeInterval};
use crate::slots::{self, CandidateSlot};

/// Drop every candidate whose buffered block overlaps a busy interval.
///
/// Order-preserving: survivors keep the generator's ascending order.
pub fn filter_busy(candidates: &[CandidateSlot], busy: &[TimeInterval]) -> Vec<CandidateSlot> {
    candidates
        .iter()
        .filter(|slot| match slot.block() {
            Some(block) => !busy.iter().any(|b| interval::overlaps(b, &block)),
            None => false,
        })
        .copied()
        .collect()
}

/// Run the whole offer pipeline for one zone-local day.
///
/// Open windows are normalised from `events` and tiled from their own start,
/// so a window reaching into `date` from the day before keeps its grid. Only
/// slots starting on `date` in the business zone are kept, then filtered
/// against `busy`.
pub fn compute_offers(
    events: &[RawEvent],
    busy: &[TimeInterval],
    config: &SchedulingConfig,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<CandidateSlot>> {
    config.validate()?;
    let day = interval::local_day(date, config.timezone)
        .ok_or_else(|| BookingError::InvalidInput(format!("date out of range: {}", date)))?;

    let windows: Vec<TimeInterval> = interval::normalize(events, config.timezone)
        .into_iter()
        .filter(|w| w.overlaps(&day))
        .collect();
    let candidates: Vec<CandidateSlot> = slots::generate(&windows, &config.policy(), now)
        .into_iter()
        .filter(|slot| day.contains(slot.start))
        .collect();
    let offers = filter_busy(&candidates, busy);

    tracing::debug!(
        %date,
        windows = windows.len(),
        candidates = candidates.len(),
        offered = offers.len(),
        "computed offers"
    );

    Ok(offers)
}

/// What a caller asks for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    /// Target day, `YYYY-MM-DD` in the business zone.
    pub date: String,
    /// Zone used for slot labels; defaults to the business zone.
    #[serde(default)]
    pub display_timezone: Option<String>,
    /// Carried through but not used for filtering.
    #[serde(default)]
    pub age_group: Option<String>,
}

/// One slot as offered to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferedSlot {
    /// RFC 3339 start in the business zone.
    pub start: String,
    /// RFC 3339 end in the business zone.
    pub end: String,
    /// `HH:MM` start time in the caller's display zone.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// The day actually answered, after horizon clamping.
    pub date: NaiveDate,
    pub slots: Vec<OfferedSlot>,
}

/// Resolve an optional display zone name, falling back to `default`.
pub fn resolve_display_zone(name: Option<&str>, default: Tz) -> Result<Tz> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n
            .parse()
            .map_err(|_| BookingError::InvalidTimezone(n.to_string())),
        None => Ok(default),
    }
}

/// Render slots for the caller: spans in `business`, labels in `display`.
pub fn to_offered(slots: &[CandidateSlot], business: Tz, display: Tz) -> Vec<OfferedSlot> {
    slots
        .iter()
        .map(|slot| OfferedSlot {
            start: slot.start.with_timezone(&business).to_rfc3339(),
            end: slot.end.with_timezone(&business).to_rfc3339(),
            label: slot.start.with_timezone(&display).format("%H:%M").to_string(),
        })
        .collect()
}
