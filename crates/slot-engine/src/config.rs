//! Scheduling configuration.
//!
//! Passed explicitly into every operation; nothing in this crate reads the
//! process environment.

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};

/// Business rules for one bookable resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Zone the resource's calendar days are defined in.
    pub timezone: Tz,
    /// Length of every offered slot.
    pub slot_minutes: u32,
    /// Gap kept free on both sides of a slot.
    pub buffer_minutes: u32,
    /// Shortest lead time between now and a slot's start.
    pub min_notice_minutes: u32,
    /// Furthest day (from today) a caller may ask about.
    pub max_days_ahead: u32,
    /// Upper bound on any single calendar call.
    pub call_timeout_secs: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Brussels,
            slot_minutes: 60,
            buffer_minutes: 10,
            min_notice_minutes: 720,
            max_days_ahead: 8,
            call_timeout_secs: 10,
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes == 0 {
            return Err(BookingError::InvalidConfig(
                "slot_minutes must be greater than zero".to_string(),
            ));
        }
        if self.call_timeout_secs == 0 {
            return Err(BookingError::InvalidConfig(
                "call_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The slot-shaping part of the configuration.
    pub fn policy(&self) -> SlotPolicy {
        SlotPolicy {
            slot_minutes: self.slot_minutes,
            buffer_minutes: self.buffer_minutes,
            min_notice_minutes: self.min_notice_minutes,
        }
    }

    pub fn call_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.call_timeout_secs)
    }
}

/// Slot length, isolation buffer and notice window, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPolicy {
    pub slot_minutes: u32,
    pub buffer_minutes: u32,
    pub min_notice_minutes: u32,
}

impl SlotPolicy {
    pub fn slot(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    pub fn buffer(&self) -> Duration {
        Duration::minutes(i64::from(self.buffer_minutes))
    }

    pub fn min_notice(&self) -> Duration {
        Duration::minutes(i64::from(self.min_notice_minutes))
    }
}
