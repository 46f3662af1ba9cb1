#![forbid(unsafe_code)]

//! Adaptive frame clock.
//!
//! The host owns the real-time pulse source (a vsync callback, a timer, a
//! test loop) and hands each pulse's monotonic nanosecond timestamp to
//! [`FrameClock::observe`]. The clock accumulates the time between pulses
//! as frame debt and releases ticks while the debt covers a whole tick
//! interval, up to [`DEFAULT_MAX_TICKS_PER_PULSE`] per pulse (adjustable
//! with [`FrameClock::set_max_ticks_per_pulse`]).
//!
//! After a host stall (sleep, debugger pause) the owed ticks are spread
//! over the following pulses instead of running all at once. The unpaid
//! debt is carried, never dropped.
//!
//! # Usage
//!
//! ```
//! use stagecraft_runtime::clock::FrameClock;
//!
//! let mut clock = FrameClock::new(60, 12).unwrap();
//! clock.start(|| {});
//! clock.observe(0);
//! clock.observe(40_000_000); // 40ms at 60Hz: two ticks owed
//! let mut ticks = 0;
//! while let Some(_tick) = clock.next_tick() {
//!     ticks += 1;
//! }
//! assert_eq!(ticks, 2);
//! ```
//!
//! # Invariants
//!
//! 1. Debt is never negative. It is below one tick interval whenever a
//!    pulse released fewer ticks than the per-pulse limit.
//! 2. Over any pulse sequence, once the carried debt has been worked off,
//!    exactly `floor(total / interval)` ticks have been released; the
//!    remainder stays as debt.
//! 3. Ticks are only released after a pulse. A rate change alone never
//!    releases one; the new interval applies from the next pulse on.
//! 4. Start and stop hooks fire only on an actual state change.
//!
//! # Failure Modes
//!
//! - Rates below 1: [`EngineError::InvalidArgument`], state unchanged.
//! - A timestamp earlier than the previous one counts as zero elapsed time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use stagecraft_core::error::{EngineError, EngineResult};

use crate::config::EngineConfig;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Ticks one pulse may release before the rest of the debt waits for the next.
pub const DEFAULT_MAX_TICKS_PER_PULSE: u32 = 8;

/// One dispatched tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Sequence number since the clock was created, starting at 1.
    pub index: u64,
    /// Full accumulated debt at dispatch, in nanoseconds.
    pub delta_nanos: f64,
}

impl Tick {
    #[must_use]
    pub fn delta(&self) -> Duration {
        Duration::from_secs_f64(self.delta_nanos / NANOS_PER_SECOND)
    }
}

/// Counters shared between the tick path and the diagnostics sampler.
///
/// The tick path is the only writer of the tick count and mean interval;
/// readers get relaxed snapshots.
#[derive(Debug, Default)]
pub struct FrameStats {
    ticks: AtomicU64,
    mean_interval_ms: AtomicU64,
    debug: AtomicBool,
}

impl FrameStats {
    #[must_use]
    pub fn new(debug: bool) -> Self {
        Self {
            debug: AtomicBool::new(debug),
            ..Self::default()
        }
    }

    /// Total ticks dispatched since creation. Never reset.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Running mean of the pulse interval that released each tick.
    #[must_use]
    pub fn mean_interval_ms(&self) -> f64 {
        f64::from_bits(self.mean_interval_ms.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn publish_mean(&self, mean_ms: f64) {
        self.mean_interval_ms
            .store(mean_ms.to_bits(), Ordering::Relaxed);
    }
}

/// Accumulating tick scheduler with focus-dependent rate.
#[derive(Debug)]
pub struct FrameClock {
    target_rate: u32,
    degraded_rate: u32,
    rate: u32,
    nanos_per_tick: f64,
    running: bool,
    now: Option<u64>,
    last: Option<u64>,
    debt: f64,
    /// Set by a pulse, cleared once its ticks are drained.
    armed: bool,
    released_this_pulse: u32,
    max_ticks_per_pulse: u32,
    /// Interval of the latest pulse, consumed by the first tick it releases.
    pending_interval: Option<f64>,
    interval_samples: u64,
    mean_interval_ms: f64,
    tick_index: u64,
    stats: Arc<FrameStats>,
}

impl FrameClock {
    /// A stopped clock running at `target_rate` until focus is lost.
    pub fn new(target_rate: u32, degraded_rate: u32) -> EngineResult<Self> {
        Self::with_stats(target_rate, degraded_rate, Arc::new(FrameStats::default()))
    }

    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let mut clock = Self::with_stats(
            config.target_rate,
            config.degraded_rate,
            Arc::new(FrameStats::new(config.debug)),
        )?;
        clock.set_max_ticks_per_pulse(config.max_ticks_per_pulse)?;
        Ok(clock)
    }

    /// A stopped clock publishing into an existing stats block.
    pub fn with_stats(
        target_rate: u32,
        degraded_rate: u32,
        stats: Arc<FrameStats>,
    ) -> EngineResult<Self> {
        check_rate(target_rate)?;
        check_rate(degraded_rate)?;
        Ok(Self {
            target_rate,
            degraded_rate,
            rate: target_rate,
            nanos_per_tick: nanos_per_tick(target_rate),
            running: false,
            now: None,
            last: None,
            debt: 0.0,
            armed: false,
            released_this_pulse: 0,
            max_ticks_per_pulse: DEFAULT_MAX_TICKS_PER_PULSE,
            pending_interval: None,
            interval_samples: 0,
            mean_interval_ms: 0.0,
            tick_index: 0,
            stats,
        })
    }

    /// Start the clock. `on_start` runs before the accumulators are reset.
    ///
    /// Returns `false` (and skips the hook) when already running.
    pub fn start(&mut self, on_start: impl FnOnce()) -> bool {
        if self.running {
            return false;
        }
        on_start();
        self.reset();
        self.running = true;
        tracing::debug!(rate = self.rate, "frame clock started");
        true
    }

    /// Stop the clock. `on_stop` runs before the accumulators are reset.
    ///
    /// Returns `false` (and skips the hook) when already stopped.
    pub fn stop(&mut self, on_stop: impl FnOnce()) -> bool {
        if !self.running {
            return false;
        }
        on_stop();
        self.running = false;
        self.reset();
        tracing::debug!(ticks = self.tick_index, "frame clock stopped");
        true
    }

    /// Clear timestamps, debt, and the interval mean.
    ///
    /// The shared tick total is left alone so samplers never see it go backwards.
    pub fn reset(&mut self) {
        self.now = None;
        self.last = None;
        self.debt = 0.0;
        self.armed = false;
        self.released_this_pulse = 0;
        self.pending_interval = None;
        self.interval_samples = 0;
        self.mean_interval_ms = 0.0;
        self.stats.publish_mean(0.0);
    }

    /// Change the tick rate. Accumulated debt is kept.
    pub fn set_rate(&mut self, rate: u32) -> EngineResult<()> {
        check_rate(rate)?;
        if rate != self.rate {
            tracing::debug!(from = self.rate, to = rate, "frame rate changed");
        }
        self.rate = rate;
        self.nanos_per_tick = nanos_per_tick(rate);
        Ok(())
    }

    /// Limit the ticks a single pulse may release. Must be at least 1.
    pub fn set_max_ticks_per_pulse(&mut self, max: u32) -> EngineResult<()> {
        if max < 1 {
            return Err(EngineError::invalid_argument(
                "max ticks per pulse must be >= 1, got 0",
            ));
        }
        self.max_ticks_per_pulse = max;
        Ok(())
    }

    #[must_use]
    pub fn max_ticks_per_pulse(&self) -> u32 {
        self.max_ticks_per_pulse
    }

    /// Switch to the target rate on focus gain, the degraded rate on loss.
    pub fn focus_changed(&mut self, focused: bool) {
        let rate = if focused {
            self.target_rate
        } else {
            self.degraded_rate
        };
        self.rate = rate;
        self.nanos_per_tick = nanos_per_tick(rate);
        tracing::debug!(focused, rate, "focus changed");
    }

    /// Record a host pulse. Ignored while stopped.
    pub fn observe(&mut self, now_nanos: u64) {
        if !self.running {
            return;
        }
        if let Some(last) = self.last {
            let between = now_nanos.saturating_sub(last) as f64;
            self.debt += between;
            self.pending_interval = Some(between);
        }
        self.now = Some(now_nanos);
        self.last = Some(now_nanos);
        self.armed = true;
        self.released_this_pulse = 0;
    }

    /// Release one tick if the debt covers a tick interval.
    ///
    /// The tick carries the whole debt; exactly one interval is then removed.
    /// Returns `None` until the next [`observe`](Self::observe) once the
    /// debt runs short or this pulse has used up its tick limit.
    pub fn next_tick(&mut self) -> Option<Tick> {
        if !self.running || !self.armed {
            return None;
        }
        if self.debt < self.nanos_per_tick {
            self.armed = false;
            return None;
        }
        if self.released_this_pulse >= self.max_ticks_per_pulse {
            self.armed = false;
            tracing::debug!(
                limit = self.max_ticks_per_pulse,
                carried_nanos = self.debt,
                "catch-up limit reached; carrying debt"
            );
            return None;
        }
        self.released_this_pulse += 1;
        let delta_nanos = self.debt;
        self.debt -= self.nanos_per_tick;
        self.tick_index += 1;
        self.stats.record_tick();

        if let Some(between) = self.pending_interval.take()
            && self.stats.is_debug()
        {
            let samples = self.interval_samples as f64;
            self.mean_interval_ms =
                (self.mean_interval_ms * samples + between / 1_000_000.0) / (samples + 1.0);
            self.interval_samples += 1;
            self.stats.publish_mean(self.mean_interval_ms);
        }

        tracing::trace!(index = self.tick_index, delta_nanos, "tick");
        Some(Tick {
            index: self.tick_index,
            delta_nanos,
        })
    }

    /// Observe `now_nanos` and dispatch owed ticks to `on_tick`, at most
    /// [`max_ticks_per_pulse`](Self::max_ticks_per_pulse) of them.
    ///
    /// Returns the number of ticks dispatched.
    pub fn pulse(&mut self, now_nanos: u64, mut on_tick: impl FnMut(Tick)) -> usize {
        self.observe(now_nanos);
        let mut count = 0;
        while let Some(tick) = self.next_tick() {
            on_tick(tick);
            count += 1;
        }
        count
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current ticks per second.
    #[must_use]
    pub fn rate(&self) -> u32 {
        self.rate
    }

    #[must_use]
    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    #[must_use]
    pub fn degraded_rate(&self) -> u32 {
        self.degraded_rate
    }

    #[must_use]
    pub fn nanos_per_tick(&self) -> f64 {
        self.nanos_per_tick
    }

    /// Undispatched time in nanoseconds.
    #[must_use]
    pub fn debt_nanos(&self) -> f64 {
        self.debt
    }

    #[must_use]
    pub fn debt(&self) -> Duration {
        Duration::from_secs_f64(self.debt / NANOS_PER_SECOND)
    }

    /// Timestamp of the latest observed pulse.
    #[must_use]
    pub fn now_nanos(&self) -> Option<u64> {
        self.now
    }

    #[must_use]
    pub fn last_nanos(&self) -> Option<u64> {
        self.last
    }

    /// Ticks dispatched by this clock.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.tick_index
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<FrameStats> {
        &self.stats
    }
}

fn check_rate(rate: u32) -> EngineResult<()> {
    if rate < 1 {
        return Err(EngineError::invalid_argument(format!(
            "tick rate must be >= 1, got {rate}"
        )));
    }
    Ok(())
}

fn nanos_per_tick(rate: u32) -> f64 {
    NANOS_PER_SECOND / f64::from(rate)
}
