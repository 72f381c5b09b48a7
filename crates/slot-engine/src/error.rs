//! Error types for slot-engine operations.

use thiserror::Error;

/// Errors surfaced to callers of the availability and booking operations.
///
/// Malformed raw calendar events are never errors: the interval engine skips
/// them. An empty day is an empty offer list, not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Missing or malformed caller input (date, booking fields, span).
    /// Rejected before any collaborator is consulted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested span is no longer free. The caller should re-query
    /// availability and pick another slot.
    #[error("Slot already taken: {0}")]
    Conflict(String),

    /// The calendar collaborator failed or timed out for a reason other than
    /// a conflict. Says nothing about whether the slot is free.
    #[error("Calendar unavailable: {0}")]
    TransientFailure(String),
}

impl BookingError {
    /// Whether repeating the same request later may succeed unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::TransientFailure(_))
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
