//! Tests for candidate slot generation.

use chrono::{DateTime, Duration, Utc};
use slot_engine::{generate, SlotPolicy, TimeInterval};

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn window(start: &str, end: &str) -> TimeInterval {
    TimeInterval::new(ts(start), ts(end)).unwrap()
}

fn policy(slot: u32, buffer: u32, notice: u32) -> SlotPolicy {
    SlotPolicy {
        slot_minutes: slot,
        buffer_minutes: buffer,
        min_notice_minutes: notice,
    }
}

fn starts(slots: &[slot_engine::CandidateSlot]) -> Vec<DateTime<Utc>> {
    slots.iter().map(|s| s.start).collect()
}

#[test]
fn three_hour_window_tiles_into_three_hourly_slots() {
    let slots = generate(
        &[window("2024-01-01T09:00:00Z", "2024-01-01T12:00:00Z")],
        &policy(60, 10, 0),
        ts("2024-01-01T00:00:00Z"),
    );

    assert_eq!(
        starts(&slots),
        vec![
            ts("2024-01-01T09:00:00Z"),
            ts("2024-01-01T10:00:00Z"),
            ts("2024-01-01T11:00:00Z"),
        ]
    );
    assert_eq!(slots[2].end, ts("2024-01-01T12:00:00Z"));
}

#[test]
fn buffer_sets_block_bounds_without_changing_spacing() {
    let slots = generate(
        &[window("2024-01-01T09:00:00Z", "2024-01-01T11:00:00Z")],
        &policy(60, 10, 0),
        ts("2024-01-01T00:00:00Z"),
    );

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].block_start, ts("2024-01-01T08:50:00Z"));
    assert_eq!(slots[0].block_end, ts("2024-01-01T10:10:00Z"));
    assert_eq!(slots[0].end, slots[1].start);
}

#[test]
fn partial_tail_is_not_offered() {
    let slots = generate(
        &[window("2024-01-01T09:00:00Z", "2024-01-01T11:30:00Z")],
        &policy(60, 0, 0),
        ts("2024-01-01T00:00:00Z"),
    );

    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|s| s.end <= ts("2024-01-01T11:30:00Z")));
}

#[test]
fn window_shorter_than_slot_yields_nothing() {
    let slots = generate(
        &[window("2024-01-01T09:00:00Z", "2024-01-01T09:45:00Z")],
        &policy(60, 0, 0),
        ts("2024-01-01T00:00:00Z"),
    );
    assert!(slots.is_empty());
}

#[test]
fn slots_never_bridge_a_gap_between_windows() {
    let slots = generate(
        &[
            window("2024-01-01T09:00:00Z", "2024-01-01T09:30:00Z"),
            window("2024-01-01T10:00:00Z", "2024-01-01T10:30:00Z"),
        ],
        &policy(60, 0, 0),
        ts("2024-01-01T00:00:00Z"),
    );
    assert!(slots.is_empty());
}

#[test]
fn each_window_is_tiled_from_its_own_start() {
    let slots = generate(
        &[
            window("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"),
            window("2024-01-01T13:15:00Z", "2024-01-01T15:15:00Z"),
        ],
        &policy(60, 0, 0),
        ts("2024-01-01T00:00:00Z"),
    );

    assert_eq!(
        starts(&slots),
        vec![
            ts("2024-01-01T09:00:00Z"),
            ts("2024-01-01T13:15:00Z"),
            ts("2024-01-01T14:15:00Z"),
        ]
    );
}

#[test]
fn notice_cutoff_drops_every_slot_of_a_short_day() {
    // now 08:00 + 720 minutes = 20:00, after the window closes.
    let slots = generate(
        &[window("2024-01-01T09:00:00Z", "2024-01-01T18:00:00Z")],
        &policy(60, 10, 720),
        ts("2024-01-01T08:00:00Z"),
    );
    assert!(slots.is_empty());
}

#[test]
fn notice_cutoff_keeps_slots_starting_at_or_after_it() {
    let now = ts("2024-01-01T08:00:00Z");
    let slots = generate(
        &[window("2024-01-01T09:00:00Z", "2024-01-01T23:00:00Z")],
        &policy(60, 10, 720),
        now,
    );

    assert_eq!(
        starts(&slots),
        vec![
            ts("2024-01-01T20:00:00Z"),
            ts("2024-01-01T21:00:00Z"),
            ts("2024-01-01T22:00:00Z"),
        ]
    );
    assert!(slots.iter().all(|s| s.start >= now + Duration::minutes(720)));
}

#[test]
fn slots_inside_notice_are_dropped_not_shifted() {
    // Cutoff 09:30 falls inside the first slot; the grid stays on the hour.
    let slots = generate(
        &[window("2024-01-01T09:00:00Z", "2024-01-01T12:00:00Z")],
        &policy(60, 0, 30),
        ts("2024-01-01T09:00:00Z"),
    );

    assert_eq!(
        starts(&slots),
        vec![ts("2024-01-01T10:00:00Z"), ts("2024-01-01T11:00:00Z")]
    );
}
