//! Commit-time validation of a booking request.
//!
//! Offers are a snapshot. Between the moment a slot was shown and the moment
//! it is booked someone else may have taken it, so the requested span is
//! checked again against busy time read at commit time.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};
use crate::interval::{self, TimeInterval};

/// Reject `requested` if any busy interval overlaps it.
///
/// Uses the bare span, not the buffered block: the buffer shapes what is
/// offered, while this check only guards against double-booking.
pub fn validate(requested: &TimeInterval, current_busy: &[TimeInterval]) -> Result<()> {
    match current_busy.iter().find(|busy| interval::overlaps(busy, requested)) {
        Some(busy) => Err(BookingError::Conflict(format!(
            "{} - {} overlaps busy time {} - {}",
            requested.start().to_rfc3339(),
            requested.end().to_rfc3339(),
            busy.start().to_rfc3339(),
            busy.end().to_rfc3339(),
        ))),
        None => Ok(()),
    }
}

/// A booking submission as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A validated booking ready to hand to the calendar store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBooking {
    pub span: TimeInterval,
    pub attendee: Attendee,
    pub age_group: Option<String>,
}

impl NewBooking {
    pub fn summary(&self) -> String {
        format!(
            "Trial lesson ({}) - {}",
            self.age_group.as_deref().unwrap_or("NA"),
            self.attendee.name
        )
    }

    pub fn description(&self) -> String {
        format!(
            "Booked online.\nPhone: {}\nAge group: {}",
            self.attendee.phone.as_deref().unwrap_or("-"),
            self.age_group.as_deref().unwrap_or("NA")
        )
    }
}

/// Returned once the store has persisted a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(BookingError::InvalidInput(format!("missing field: {}", field)))
    } else {
        Ok(value)
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl BookingRequest {
    /// Check required fields and parse the span. Makes no external calls.
    pub fn parse(&self, zone: Tz) -> Result<NewBooking> {
        let start_text = required(&self.start, "start")?;
        let end_text = required(&self.end, "end")?;
        let name = required(&self.name, "name")?;
        let email = required(&self.email, "email")?;

        let start = interval::parse_instant(start_text, zone)
            .ok_or_else(|| BookingError::InvalidInput(format!("invalid start: {}", start_text)))?;
        let end = interval::parse_instant(end_text, zone)
            .ok_or_else(|| BookingError::InvalidInput(format!("invalid end: {}", end_text)))?;
        let span = TimeInterval::new(start, end).ok_or_else(|| {
            BookingError::InvalidInput("booking must end after it starts".to_string())
        })?;

        Ok(NewBooking {
            span,
            attendee: Attendee {
                name: name.to_string(),
                email: email.to_string(),
                phone: optional(self.phone.as_deref()),
            },
            age_group: optional(self.age_group.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BookingRequest {
        BookingRequest {
            start: "2024-01-01T10:00:00+01:00".to_string(),
            end: "2024-01-01T11:00:00+01:00".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: Some("  ".to_string()),
            age_group: Some("6-7".to_string()),
        }
    }

    #[test]
    fn parse_accepts_complete_request() {
        let booking = request().parse(chrono_tz::Europe::Brussels).unwrap();
        assert_eq!(booking.span.duration_minutes(), 60);
        assert_eq!(booking.attendee.phone, None);
        assert_eq!(booking.summary(), "Trial lesson (6-7) - Ada");
    }

    #[test]
    fn parse_rejects_missing_email() {
        let req = BookingRequest {
            email: String::new(),
            ..request()
        };
        let err = req.parse(chrono_tz::Europe::Brussels).unwrap_err();
        assert_eq!(err, BookingError::InvalidInput("missing field: email".to_string()));
    }

    #[test]
    fn parse_rejects_inverted_span() {
        let req = BookingRequest {
            start: "2024-01-01T11:00:00+01:00".to_string(),
            end: "2024-01-01T10:00:00+01:00".to_string(),
            ..request()
        };
        assert!(matches!(
            req.parse(chrono_tz::Europe::Brussels),
            Err(BookingError::InvalidInput(_))
        ));
    }
}
