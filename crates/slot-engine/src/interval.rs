//! Half-open time intervals and raw calendar event normalisation.
//!
//! Raw events come from the availability calendar in the Google Calendar
//! shape: either a timed event (`dateTime`) or an all-day event (`date`).
//! [`normalize`] turns them into a sorted, disjoint set of open windows.
//! Records that cannot be interpreted are skipped, never reported as errors.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A half-open span `[start, end)` with `start < end`.
///
/// Instants are stored in UTC; the business zone only matters when raw
/// events are interpreted and when spans are rendered back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Build an interval, or `None` if it would be empty or inverted.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// See [`overlaps`].
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        overlaps(self, other)
    }

    /// `start <= at < end`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
///
/// Touching endpoints (`a.end == b.start`) do not overlap.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start < b.end && b.start < a.end
}

/// One side of a raw calendar event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    /// Timestamp, ideally offset-qualified (`2024-01-01T09:00:00+01:00`).
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// Whole calendar date (`2024-01-01`) for all-day events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// An event as listed by the availability calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

impl RawEvent {
    pub fn timed(start: &str, end: &str) -> Self {
        Self {
            start: Some(EventTime {
                date_time: Some(start.to_string()),
                date: None,
            }),
            end: Some(EventTime {
                date_time: Some(end.to_string()),
                date: None,
            }),
        }
    }

    pub fn all_day(date: &str) -> Self {
        Self {
            start: Some(EventTime {
                date_time: None,
                date: Some(date.to_string()),
            }),
            end: None,
        }
    }
}

/// Parse a timestamp into a UTC instant.
///
/// RFC 3339 text carries its own offset. A bare wall-clock time
/// (`2024-01-01T09:00:00`) is read in `zone`; ambiguous times resolve to the
/// earlier instant and times inside a DST gap yield `None`.
pub fn parse_instant(text: &str, zone: Tz) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .and_then(|naive| zone.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// The first existing instant of `date` in `zone`.
///
/// Usually local midnight. Where midnight falls inside a DST gap the day
/// starts at the end of the gap.
pub fn start_of_day(date: NaiveDate, zone: Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=24 * 4)
        .map(|quarter| midnight + chrono::Duration::minutes(15 * quarter))
        .find_map(|local| zone.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// The zone-local calendar day `[start_of_day(date), start_of_day(date + 1))`.
///
/// The length follows the zone's calendar, so DST days are 23 or 25 hours.
pub fn local_day(date: NaiveDate, zone: Tz) -> Option<TimeInterval> {
    let next = date.checked_add_days(Days::new(1))?;
    TimeInterval::new(start_of_day(date, zone)?, start_of_day(next, zone)?)
}

/// Convert one raw event into an open window, if it describes one.
fn window_from_event(event: &RawEvent, zone: Tz) -> Option<TimeInterval> {
    let start = event.start.as_ref()?;

    if let Some(start_text) = start.date_time.as_deref() {
        let end_text = event
            .end
            .as_ref()
            .and_then(|end| end.date_time.as_deref())
            .unwrap_or(start_text);
        return TimeInterval::new(parse_instant(start_text, zone)?, parse_instant(end_text, zone)?);
    }

    let day = NaiveDate::parse_from_str(start.date.as_deref()?.trim(), "%Y-%m-%d").ok()?;
    local_day(day, zone)
}

/// Normalise raw availability events into sorted, disjoint open windows.
///
/// Events without a usable start, with unparseable timestamps, or spanning
/// zero or negative time are dropped.
pub fn normalize(events: &[RawEvent], zone: Tz) -> Vec<TimeInterval> {
    let windows: Vec<TimeInterval> = events
        .iter()
        .filter_map(|event| {
            let window = window_from_event(event, zone);
            if window.is_none() {
                tracing::debug!(?event, "skipping unusable availability event");
            }
            window
        })
        .collect();

    merge(&windows)
}

/// Merge overlapping or touching intervals.
///
/// Returns a sorted, non-overlapping list covering exactly the same instants.
pub fn merge(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted = intervals.to_vec();
    sorted.sort();

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn new_rejects_empty_and_inverted() {
        assert!(TimeInterval::new(at(9, 0), at(9, 0)).is_none());
        assert!(TimeInterval::new(at(10, 0), at(9, 0)).is_none());
        assert!(TimeInterval::new(at(9, 0), at(9, 1)).is_some());
    }

    #[test]
    fn contains_is_half_open() {
        let a = TimeInterval::new(at(9, 0), at(10, 0)).unwrap();
        assert!(a.contains(at(9, 0)));
        assert!(a.contains(at(9, 59)));
        assert!(!a.contains(at(10, 0)));
    }

    #[test]
    fn naive_timestamp_in_dst_gap_is_rejected() {
        // Europe/Brussels springs forward 02:00 -> 03:00 on 2024-03-31.
        let zone: Tz = "Europe/Brussels".parse().unwrap();
        assert_eq!(parse_instant("2024-03-31T02:30:00", zone), None);
        assert!(parse_instant("2024-03-31T03:30:00", zone).is_some());
    }
}
