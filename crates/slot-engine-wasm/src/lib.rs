//! WASM bindings for slot-engine.
//!
//! Exposes the pure offer pipeline, the commit-time conflict check and the
//! booking-horizon clamp to JavaScript via `wasm-bindgen`. All complex types
//! are passed as JSON strings. Calendar I/O stays on the JavaScript side: the
//! host fetches events and busy time and hands them in.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use slot_engine::availability::{self, OfferedSlot};
use slot_engine::interval::{parse_instant, RawEvent, TimeInterval};
use slot_engine::{dates, BookingError, SchedulingConfig};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Busy range as sent by JavaScript (e.g. a Google free/busy entry).
#[derive(Deserialize)]
struct BusyInput {
    start: String,
    end: String,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ValidationDto {
    Ok,
    Conflict { message: String },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_zone(name: &str) -> Result<Tz, String> {
    name.parse()
        .map_err(|_| BookingError::InvalidTimezone(name.to_string()).to_string())
}

fn parse_utc(text: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid datetime '{}': {}", text, e))
}

/// Parse busy ranges. Unlike open windows, a busy range that cannot be read
/// is an error: skipping it could offer time that is taken.
fn parse_busy_json(json: &str, zone: Tz) -> Result<Vec<TimeInterval>, String> {
    let inputs: Vec<BusyInput> =
        serde_json::from_str(json).map_err(|e| format!("Invalid busy JSON: {}", e))?;

    inputs
        .into_iter()
        .map(|input| {
            let start = parse_instant(&input.start, zone)
                .ok_or_else(|| format!("Invalid busy start '{}'", input.start))?;
            let end = parse_instant(&input.end, zone)
                .ok_or_else(|| format!("Invalid busy end '{}'", input.end))?;
            TimeInterval::new(start, end)
                .ok_or_else(|| format!("Empty busy range {} - {}", input.start, input.end))
        })
        .collect()
}

fn offers_json(
    config_json: &str,
    events_json: &str,
    busy_json: &str,
    date: &str,
    now: &str,
    display_timezone: Option<&str>,
) -> Result<String, String> {
    let config: SchedulingConfig =
        serde_json::from_str(config_json).map_err(|e| format!("Invalid config JSON: {}", e))?;
    let events: Vec<RawEvent> =
        serde_json::from_str(events_json).map_err(|e| format!("Invalid events JSON: {}", e))?;
    let busy = parse_busy_json(busy_json, config.timezone)?;
    let date = dates::parse_date(date).map_err(|e| e.to_string())?;
    let now = parse_utc(now)?;
    let display = availability::resolve_display_zone(display_timezone, config.timezone)
        .map_err(|e| e.to_string())?;

    let slots = availability::compute_offers(&events, &busy, &config, date, now)
        .map_err(|e| e.to_string())?;
    let offered: Vec<OfferedSlot> = availability::to_offered(&slots, config.timezone, display);

    serde_json::to_string(&offered).map_err(|e| format!("Serialization error: {}", e))
}

fn validation_json(start: &str, end: &str, busy_json: &str, timezone: &str) -> Result<String, String> {
    let zone = parse_zone(timezone)?;
    let start = parse_instant(start, zone).ok_or_else(|| format!("Invalid start '{}'", start))?;
    let end = parse_instant(end, zone).ok_or_else(|| format!("Invalid end '{}'", end))?;
    let span = TimeInterval::new(start, end).ok_or("Booking must end after it starts")?;
    let busy = parse_busy_json(busy_json, zone)?;

    let dto = match slot_engine::validate(&span, &busy) {
        Ok(()) => ValidationDto::Ok,
        Err(BookingError::Conflict(message)) => ValidationDto::Conflict { message },
        Err(other) => return Err(other.to_string()),
    };

    serde_json::to_string(&dto).map_err(|e| format!("Serialization error: {}", e))
}

fn clamp_date_str(date: &str, today: &str, max_days_ahead: u32) -> Result<String, String> {
    let target = dates::parse_date(date).map_err(|e| e.to_string())?;
    let today = dates::parse_date(today).map_err(|e| e.to_string())?;
    Ok(dates::clamp_to_horizon(target, today, max_days_ahead).to_string())
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute the offered slots for one day.
///
/// # Arguments
/// - `config_json` -- Scheduling config object; missing fields use defaults
/// - `events_json` -- JSON array of raw availability events (`{start: {dateTime|date}, end}`)
/// - `busy_json` -- JSON array of `{start, end}` busy ranges
/// - `date` -- Day to answer for (`YYYY-MM-DD`, business zone)
/// - `now` -- Current instant (RFC 3339)
/// - `display_timezone` -- Optional IANA zone for labels
///
/// Returns a JSON array of `{start, end, label}` objects.
#[wasm_bindgen(js_name = "computeOffers")]
pub fn compute_offers(
    config_json: &str,
    events_json: &str,
    busy_json: &str,
    date: &str,
    now: &str,
    display_timezone: Option<String>,
) -> Result<String, JsValue> {
    offers_json(
        config_json,
        events_json,
        busy_json,
        date,
        now,
        display_timezone.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Re-check a requested span against freshly read busy ranges.
///
/// Returns `{"status":"ok"}` or `{"status":"conflict","message":...}`.
/// Malformed input is thrown as an error.
#[wasm_bindgen(js_name = "validateBooking")]
pub fn validate_booking(start: &str, end: &str, busy_json: &str, timezone: &str) -> Result<String, JsValue> {
    validation_json(start, end, busy_json, timezone).map_err(|e| JsValue::from_str(&e))
}

/// Clamp a requested date into `[today, today + max_days_ahead]`.
#[wasm_bindgen(js_name = "clampDate")]
pub fn clamp_date(date: &str, today: &str, max_days_ahead: u32) -> Result<String, JsValue> {
    clamp_date_str(date, today, max_days_ahead).map_err(|e| JsValue::from_str(&e))
}
