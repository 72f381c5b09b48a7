//! # slot-engine
//!
//! Bookable slot derivation and double-booking protection for a single
//! resource calendar (one instructor, one room).
//!
//! Open availability and busy time are read from an external calendar. The
//! engine turns them into a set of fixed-length slots that never overlap each
//! other, never start inside the notice window and keep a buffer clear of
//! existing bookings. At commit time the requested span is re-checked against
//! fresh busy time before the booking is written.
//!
//! ## Modules
//!
//! - [`interval`]: half-open intervals, raw event normalisation, merging
//! - [`slots`]: tile open windows into candidate slots
//! - [`availability`]: busy filtering and the offer pipeline
//! - [`validator`]: commit-time conflict check and booking requests
//! - [`dates`]: request dates and the booking horizon
//! - [`config`]: explicit scheduling configuration
//! - [`calendar`]: calendar collaborator ports and an in-memory calendar (feature `service`)
//! - [`service`]: async availability and booking operations (feature `service`)
//! - [`error`]: Error types

pub mod availability;
#[cfg(feature = "service")]
pub mod calendar;
pub mod config;
pub mod dates;
pub mod error;
pub mod interval;
#[cfg(feature = "service")]
pub mod service;
pub mod slots;
pub mod validator;

pub use availability::{compute_offers, filter_busy, AvailabilityQuery, AvailabilityResponse, OfferedSlot};
#[cfg(feature = "service")]
pub use calendar::{BookingStore, CalendarError, CalendarSource, MemoryCalendar};
pub use config::{SchedulingConfig, SlotPolicy};
pub use error::BookingError;
pub use interval::{merge, normalize, overlaps, RawEvent, TimeInterval};
#[cfg(feature = "service")]
pub use service::Scheduler;
pub use slots::{generate, CandidateSlot};
pub use validator::{validate, BookingConfirmation, BookingRequest, NewBooking};
