//! Availability queries and booking attempts against the external calendar.
//!
//! Each call is independent and holds no state between requests. A booking
//! attempt moves `Requested -> Validating -> {Confirmed | Conflict |
//! TransientFailure}`; nothing is retried here, a retry is a new attempt.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::availability::{self, AvailabilityQuery, AvailabilityResponse};
use crate::calendar::{BookingStore, CalendarError, CalendarSource};
use crate::config::SchedulingConfig;
use crate::dates;
use crate::error::{BookingError, Result};
use crate::interval::{self, TimeInterval};
use crate::validator::{self, BookingConfirmation, BookingRequest};

/// Answers availability queries and commits bookings for one resource.
#[derive(Debug)]
pub struct Scheduler<S> {
    config: SchedulingConfig,
    source: S,
}

impl<S: CalendarSource> Scheduler<S> {
    pub fn new(config: SchedulingConfig, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, source })
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Offered slots for the queried day.
    ///
    /// The date is clamped to `[today, today + max_days_ahead]`. A day with
    /// no open windows is an empty list. If either calendar read fails the
    /// whole query fails: slots are never offered without a busy check.
    pub async fn availability(
        &self,
        query: &AvailabilityQuery,
        now: DateTime<Utc>,
    ) -> Result<AvailabilityResponse> {
        let zone = self.config.timezone;
        let requested = dates::parse_date(&query.date)?;
        let display = availability::resolve_display_zone(query.display_timezone.as_deref(), zone)?;

        let date = dates::clamp_to_horizon(
            requested,
            dates::today_in(zone, now),
            self.config.max_days_ahead,
        );
        let day = interval::local_day(date, zone)
            .ok_or_else(|| BookingError::InvalidInput(format!("date out of range: {}", date)))?;

        let events = self
            .read("list open windows", self.source.open_events(&day))
            .await?;
        if interval::normalize(&events, zone).is_empty() {
            tracing::debug!(%date, "no open windows");
            return Ok(AvailabilityResponse {
                date,
                slots: Vec::new(),
            });
        }

        // Buffered blocks of the first and last slot reach past the day; the
        // last slot itself may end up to one slot length after midnight.
        let policy = self.config.policy();
        let busy_range = TimeInterval::new(
            day.start() - policy.buffer(),
            day.end() + policy.slot() + policy.buffer(),
        )
        .unwrap_or(day);
        let busy = self
            .read("query busy time", self.source.busy(&busy_range))
            .await?;

        let offers = availability::compute_offers(&events, &busy, &self.config, date, now)?;

        Ok(AvailabilityResponse {
            date,
            slots: availability::to_offered(&offers, zone, display),
        })
    }

    /// Validate and commit one booking.
    ///
    /// Busy time for exactly the requested span is read fresh; earlier offers
    /// are not trusted. A conflict reported by the store on write is the same
    /// [`BookingError::Conflict`] as one found by the pre-check.
    pub async fn book<B>(&self, store: &B, request: &BookingRequest) -> Result<BookingConfirmation>
    where
        B: BookingStore + ?Sized,
    {
        let booking = request.parse(self.config.timezone)?;
        let span = booking.span;

        let busy = self
            .read("re-check busy time", self.source.busy(&span))
            .await?;
        if let Err(err) = validator::validate(&span, &busy) {
            tracing::warn!(start = %span.start(), end = %span.end(), "booking rejected by pre-check");
            return Err(err);
        }

        let booking_id = match tokio::time::timeout(self.config.call_timeout(), store.insert(&booking)).await {
            Ok(Ok(id)) => id,
            Ok(Err(CalendarError::Conflict(msg))) => {
                tracing::warn!(start = %span.start(), end = %span.end(), %msg, "booking rejected by store");
                return Err(BookingError::Conflict(msg));
            }
            Ok(Err(CalendarError::Unavailable(msg))) => {
                tracing::warn!(%msg, "booking insert failed");
                return Err(BookingError::TransientFailure(msg));
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.config.call_timeout_secs, "booking insert timed out");
                return Err(BookingError::TransientFailure(format!(
                    "insert booking timed out after {}s",
                    self.config.call_timeout_secs
                )));
            }
        };

        tracing::info!(%booking_id, start = %span.start(), end = %span.end(), "booking confirmed");

        Ok(BookingConfirmation {
            booking_id,
            start: span.start(),
            end: span.end(),
        })
    }

    /// Await a calendar read under the configured timeout.
    ///
    /// Reads never signal conflicts, so every failure is transient.
    async fn read<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, CalendarError>>,
    {
        match tokio::time::timeout(self.config.call_timeout(), call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::warn!(%err, "{} failed", what);
                Err(BookingError::TransientFailure(format!("{}: {}", what, err)))
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.config.call_timeout_secs, "{} timed out", what);
                Err(BookingError::TransientFailure(format!(
                    "{} timed out after {}s",
                    what, self.config.call_timeout_secs
                )))
            }
        }
    }
}
