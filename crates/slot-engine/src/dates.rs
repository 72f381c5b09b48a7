//! Request-date parsing and booking-horizon clamping.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{BookingError, Result};

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BookingError::InvalidInput("missing date".to_string()));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| BookingError::InvalidInput(format!("invalid date '{}': {}", text, e)))
}

/// Today's date in `zone`.
pub fn today_in(zone: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&zone).date_naive()
}

/// Pull `target` into `[today, today + max_days_ahead]`.
///
/// Past dates answer for today; dates past the horizon answer for the last
/// bookable day.
pub fn clamp_to_horizon(target: NaiveDate, today: NaiveDate, max_days_ahead: u32) -> NaiveDate {
    let horizon = today
        .checked_add_days(Days::new(u64::from(max_days_ahead)))
        .unwrap_or(NaiveDate::MAX);
    target.clamp(today, horizon)
}
