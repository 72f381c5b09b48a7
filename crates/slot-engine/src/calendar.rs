//! Ports to the external calendar, plus an in-process implementation.
//!
//! The engine reads open windows and busy time through [`CalendarSource`] and
//! persists bookings through [`BookingStore`]. The store is the only shared
//! mutable resource; its own write-time conflict signal is authoritative.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::interval::{self, RawEvent, TimeInterval};
use crate::validator::{Attendee, NewBooking};

/// Failure reported by a calendar collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// The write was refused because the span is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Network, auth or backend failure unrelated to the span's state.
    #[error("calendar unavailable: {0}")]
    Unavailable(String),
}

/// Read side of the calendar.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Raw open-window events touching `range`.
    async fn open_events(&self, range: &TimeInterval) -> Result<Vec<RawEvent>, CalendarError>;

    /// Busy intervals touching `range`.
    async fn busy(&self, range: &TimeInterval) -> Result<Vec<TimeInterval>, CalendarError>;
}

/// Write side of the calendar.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist `booking`, returning its identifier.
    ///
    /// Must fail with [`CalendarError::Conflict`] if the span is taken.
    async fn insert(&self, booking: &NewBooking) -> Result<String, CalendarError>;
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBooking {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub attendee: Attendee,
    #[serde(default)]
    pub age_group: Option<String>,
}

impl StoredBooking {
    pub fn span(&self) -> Option<TimeInterval> {
        TimeInterval::new(self.start, self.end)
    }
}

/// Serialisable contents of a [`MemoryCalendar`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarData {
    /// Open-window events for the bookable resource.
    #[serde(default)]
    pub availability: Vec<RawEvent>,
    /// Confirmed bookings; these are the busy time.
    #[serde(default)]
    pub bookings: Vec<StoredBooking>,
}

/// Calendar held in memory behind a single lock.
///
/// Inserts check for overlap and append under the same lock, so of several
/// concurrent inserts for one span exactly one succeeds.
#[derive(Debug)]
pub struct MemoryCalendar {
    zone: Tz,
    data: Mutex<CalendarData>,
}

impl MemoryCalendar {
    pub fn new(zone: Tz, data: CalendarData) -> Self {
        Self {
            zone,
            data: Mutex::new(data),
        }
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> CalendarData {
        self.data.lock().await.clone()
    }
}

#[async_trait]
impl CalendarSource for MemoryCalendar {
    async fn open_events(&self, range: &TimeInterval) -> Result<Vec<RawEvent>, CalendarError> {
        let data = self.data.lock().await;
        Ok(data
            .availability
            .iter()
            .filter(|event| {
                // Unusable events are passed through; normalisation drops them.
                let windows = interval::normalize(std::slice::from_ref(*event), self.zone);
                windows.is_empty() || windows.iter().any(|w| w.overlaps(range))
            })
            .cloned()
            .collect())
    }

    async fn busy(&self, range: &TimeInterval) -> Result<Vec<TimeInterval>, CalendarError> {
        let data = self.data.lock().await;
        Ok(data
            .bookings
            .iter()
            .filter_map(StoredBooking::span)
            .filter(|span| span.overlaps(range))
            .collect())
    }
}

#[async_trait]
impl BookingStore for MemoryCalendar {
    async fn insert(&self, booking: &NewBooking) -> Result<String, CalendarError> {
        let mut data = self.data.lock().await;

        if let Some(existing) = data
            .bookings
            .iter()
            .find(|b| b.span().is_some_and(|span| span.overlaps(&booking.span)))
        {
            return Err(CalendarError::Conflict(format!(
                "overlaps booking {}",
                existing.id
            )));
        }

        let mut seq = data.bookings.len() + 1;
        let mut id = format!("bk-{:06}", seq);
        while data.bookings.iter().any(|b| b.id == id) {
            seq += 1;
            id = format!("bk-{:06}", seq);
        }
        data.bookings.push(StoredBooking {
            id: id.clone(),
            start: booking.span.start(),
            end: booking.span.end(),
            summary: booking.summary(),
            description: booking.description(),
            attendee: booking.attendee.clone(),
            age_group: booking.age_group.clone(),
        });

        Ok(id)
    }
}

#[async_trait]
impl<T: CalendarSource + ?Sized> CalendarSource for std::sync::Arc<T> {
    async fn open_events(&self, range: &TimeInterval) -> Result<Vec<RawEvent>, CalendarError> {
        (**self).open_events(range).await
    }

    async fn busy(&self, range: &TimeInterval) -> Result<Vec<TimeInterval>, CalendarError> {
        (**self).busy(range).await
    }
}

#[async_trait]
impl<T: BookingStore + ?Sized> BookingStore for std::sync::Arc<T> {
    async fn insert(&self, booking: &NewBooking) -> Result<String, CalendarError> {
        (**self).insert(booking).await
    }
}
