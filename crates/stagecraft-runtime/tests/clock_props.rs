//! Property tests for frame-debt accounting.

use proptest::prelude::*;
use stagecraft_runtime::clock::{DEFAULT_MAX_TICKS_PER_PULSE, FrameClock};

/// Rates whose tick interval is a whole number of nanoseconds, so debt
/// arithmetic stays exact in `f64`.
const EXACT_RATES: [u32; 12] = [1, 2, 4, 5, 8, 10, 20, 25, 40, 50, 100, 125];

fn running(rate: u32) -> FrameClock {
    let mut clock = FrameClock::new(rate, 1).unwrap();
    clock.start(|| {});
    clock
}

/// Pulse at `now` without advancing time until no tick is owed.
fn settle(clock: &mut FrameClock, now: u64) -> u64 {
    let mut ticks = 0;
    loop {
        let released = clock.pulse(now, |_| {});
        if released == 0 {
            return ticks;
        }
        ticks += released as u64;
    }
}

proptest! {
    #[test]
    fn tick_count_is_floor_of_total(
        rate_index in 0usize..EXACT_RATES.len(),
        gaps in prop::collection::vec(0u64..300_000_000, 1..200),
    ) {
        let rate = EXACT_RATES[rate_index];
        let mut clock = running(rate);
        let npt = 1_000_000_000u64 / u64::from(rate);

        let mut now = 0u64;
        clock.observe(now);
        let mut ticks = 0u64;
        for gap in &gaps {
            now += gap;
            let released = clock.pulse(now, |_| {});
            prop_assert!(released <= DEFAULT_MAX_TICKS_PER_PULSE as usize);
            prop_assert!(clock.debt_nanos() >= 0.0);
            if released < DEFAULT_MAX_TICKS_PER_PULSE as usize {
                prop_assert!(clock.debt_nanos() < clock.nanos_per_tick());
            }
            ticks += released as u64;
        }
        ticks += settle(&mut clock, now);

        let total: u64 = gaps.iter().sum();
        prop_assert_eq!(ticks, total / npt);
        prop_assert_eq!(clock.debt_nanos(), (total % npt) as f64);
    }

    #[test]
    fn tick_deltas_never_fall_below_interval(
        rate in 1u32..240,
        gaps in prop::collection::vec(0u64..100_000_000, 1..100),
    ) {
        let mut clock = running(rate);
        clock.observe(0);
        let mut now = 0;
        for gap in gaps {
            now += gap;
            let npt = clock.nanos_per_tick();
            clock.pulse(now, |tick| assert!(tick.delta_nanos >= npt));
        }
    }

    #[test]
    fn rate_switch_releases_nothing_until_next_pulse(
        first in 1u32..240,
        second in 1u32..240,
        gaps in prop::collection::vec(0u64..50_000_000, 1..50),
    ) {
        let mut clock = running(first);
        clock.observe(0);
        let mut now = 0;
        for gap in gaps {
            now += gap;
            clock.pulse(now, |_| {});
        }
        settle(&mut clock, now);
        let debt = clock.debt_nanos();
        clock.set_rate(second).unwrap();
        prop_assert!(clock.next_tick().is_none());
        prop_assert_eq!(clock.debt_nanos(), debt);

        // Zero-length pulses convert the carried debt at the new rate only.
        let expected = (debt / clock.nanos_per_tick()).floor() as u64;
        let released = settle(&mut clock, now);
        prop_assert!(released.abs_diff(expected) <= 1);
        prop_assert!(clock.debt_nanos() < clock.nanos_per_tick());
    }
}

#[test]
fn sixty_hz_over_one_second() {
    let mut clock = running(60);
    clock.observe(0);
    let mut ticks = 0;
    for i in 1..=1_000u64 {
        ticks += clock.pulse(i * 1_000_000, |_| {});
    }
    assert!((59..=60).contains(&ticks), "ticks = {ticks}");
}

#[test]
fn degraded_rate_slows_ticks() {
    let mut clock = FrameClock::new(60, 12).unwrap();
    clock.start(|| {});
    clock.focus_changed(false);
    clock.observe(0);
    let mut ticks = 0;
    for i in 1..=105u64 {
        ticks += clock.pulse(i * 10_000_000, |_| {});
    }
    assert_eq!(ticks, 12);
}
