//! Property-based tests for the offer pipeline using proptest.
//!
//! These tests verify invariants that should hold for *any* set of open
//! windows and busy intervals, not just the scenarios in the other suites.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use slot_engine::{filter_busy, generate, merge, overlaps, validate, SlotPolicy, TimeInterval};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// An interval inside a two-day range, 1 minute to 12 hours long.
fn arb_interval() -> impl Strategy<Value = TimeInterval> {
    (0i64..(2 * 24 * 60), 1i64..=(12 * 60)).prop_map(|(offset, len)| {
        let start = base() + Duration::minutes(offset);
        TimeInterval::new(start, start + Duration::minutes(len)).unwrap()
    })
}

fn arb_intervals(max: usize) -> impl Strategy<Value = Vec<TimeInterval>> {
    prop::collection::vec(arb_interval(), 0..max)
}

fn arb_policy() -> impl Strategy<Value = SlotPolicy> {
    (prop_oneof![Just(15u32), Just(30), Just(45), Just(60), Just(90)], 0u32..=30, 0u32..=1440).prop_map(
        |(slot, buffer, notice)| SlotPolicy {
            slot_minutes: slot,
            buffer_minutes: buffer,
            min_notice_minutes: notice,
        },
    )
}

fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..(2 * 24 * 60)).prop_map(|m| base() + Duration::minutes(m))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn merged_windows_are_sorted_and_disjoint(windows in arb_intervals(20)) {
        let merged = merge(&windows);
        for pair in merged.windows(2) {
            prop_assert!(pair[0].end() < pair[1].start());
        }
        // Every input instant is still covered.
        for w in &windows {
            prop_assert!(merged.iter().any(|m| m.start() <= w.start() && w.end() <= m.end()));
        }
    }

    #[test]
    fn generated_slots_are_disjoint_and_respect_notice(
        windows in arb_intervals(10),
        policy in arb_policy(),
        now in arb_now(),
    ) {
        let merged = merge(&windows);
        let slots = generate(&merged, &policy, now);
        let cutoff = now + Duration::minutes(i64::from(policy.min_notice_minutes));

        for pair in slots.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
        for slot in &slots {
            prop_assert!(slot.start >= cutoff);
            prop_assert_eq!(slot.end - slot.start, Duration::minutes(i64::from(policy.slot_minutes)));
            prop_assert!(merged.iter().any(|w| w.start() <= slot.start && slot.end <= w.end()));
        }
    }

    #[test]
    fn filtered_slots_keep_their_buffer_clear(
        windows in arb_intervals(10),
        busy in arb_intervals(10),
        policy in arb_policy(),
        now in arb_now(),
    ) {
        let slots = generate(&merge(&windows), &policy, now);
        let offered = filter_busy(&slots, &busy);

        for slot in &offered {
            let block = slot.block().unwrap();
            prop_assert!(busy.iter().all(|b| !overlaps(b, &block)));
            // Offered spans always pass the commit-time check.
            prop_assert_eq!(validate(&slot.span().unwrap(), &busy), Ok(()));
        }
    }

    #[test]
    fn pipeline_is_deterministic(
        windows in arb_intervals(10),
        busy in arb_intervals(10),
        policy in arb_policy(),
        now in arb_now(),
    ) {
        let first = filter_busy(&generate(&merge(&windows), &policy, now), &busy);
        let second = filter_busy(&generate(&merge(&windows), &policy, now), &busy);
        prop_assert_eq!(first, second);
    }
}
