#![forbid(unsafe_code)]

//! Frame-stepped open/close transitions driven by a sampled easing curve.
//!
//! A [`Transition`] walks a [`CurveSamples`] one sample per tick. Opening maps
//! each sample's `y` to rising opacity and scale; closing maps it to falling
//! ones. A closing transition carries a one-shot completion payload `C` that
//! is handed back exactly once, on the tick that consumes the last sample.
//!
//! The payload is returned from [`Transition::advance`] instead of being
//! invoked internally, so the owner can act on it with full access to its own
//! state. `C` can be a plain value (an enum describing what to do next) or a
//! boxed closure:
//!
//! ```
//! use stagecraft_core::curve::CubicBezier;
//! use stagecraft_core::transition::Transition;
//!
//! let samples = CubicBezier::dialog().build().unwrap();
//! let mut fade: Transition<Box<dyn FnOnce() -> &'static str>> = Transition::new(samples);
//! fade.close(Box::new(|| "closed"));
//! let mut result = None;
//! while fade.is_running() {
//!     if let Some(done) = fade.advance().completed {
//!         result = Some(done());
//!     }
//! }
//! assert_eq!(result, Some("closed"));
//! ```
//!
//! # Invariants
//!
//! 1. `open()` and `close()` reset the frame cursor to 0.
//! 2. The cursor never exceeds the sample count.
//! 3. A completion payload is returned at most once per `close()`.
//! 4. A payload replaced by a later `close()`, or dropped by `open()` or
//!    `cancel()`, is never returned.
//! 5. Opening never produces a completion payload.

use std::fmt;
use std::time::Duration;

use crate::curve::{CubicBezier, CurveSamples};
use crate::error::{EngineError, EngineResult};

/// Phase of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionState {
    #[default]
    Idle,
    Opening,
    Closing,
}

/// Visual values for one tick of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    /// Raw curve output for this tick.
    pub progress: f64,
    pub opacity: f64,
    pub scale: f64,
}

impl TransitionFrame {
    /// Scale an opening entity starts from.
    pub const MIN_SCALE: f64 = 0.4;

    #[must_use]
    pub fn opening(y: f64) -> Self {
        Self {
            progress: y,
            opacity: y,
            scale: Self::MIN_SCALE + (1.0 - Self::MIN_SCALE) * y,
        }
    }

    #[must_use]
    pub fn closing(y: f64) -> Self {
        Self {
            progress: y,
            opacity: 1.0 - y,
            scale: 1.0 - (1.0 - Self::MIN_SCALE) * y,
        }
    }
}

/// Result of one [`Transition::advance`] call.
#[derive(Debug)]
pub struct Advance<C> {
    /// Values to apply this tick, `None` when the transition was idle.
    pub frame: Option<TransitionFrame>,
    /// The completion payload, present only on the tick a close finishes.
    pub completed: Option<C>,
}

impl<C> Advance<C> {
    fn idle() -> Self {
        Self {
            frame: None,
            completed: None,
        }
    }
}

/// A sampled curve paired with the wall-clock length it was tuned for.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionCurve {
    samples: CurveSamples,
    duration: Duration,
}

impl TransitionCurve {
    #[must_use]
    pub fn new(samples: CurveSamples, duration: Duration) -> Self {
        Self { samples, duration }
    }

    /// Build `bezier` with one sample per tick of `duration` at `ticks_per_second`.
    ///
    /// The resolution is clamped to the range [`CubicBezier`] accepts.
    pub fn timed(
        bezier: CubicBezier,
        duration: Duration,
        ticks_per_second: u32,
    ) -> EngineResult<Self> {
        if ticks_per_second < 1 {
            return Err(EngineError::invalid_argument(
                "transition tick rate must be >= 1",
            ));
        }
        let ticks = (duration.as_secs_f64() * f64::from(ticks_per_second)).round();
        let resolution = if ticks >= f64::from(CubicBezier::MAX_RESOLUTION) {
            CubicBezier::MAX_RESOLUTION
        } else {
            (ticks as u32).max(CubicBezier::MIN_RESOLUTION)
        };
        let samples = bezier.resolution(resolution).build()?;
        Ok(Self { samples, duration })
    }

    /// A linear fade lasting roughly `duration` at `ticks_per_second`.
    pub fn fade(duration: Duration, ticks_per_second: u32) -> EngineResult<Self> {
        Self::timed(CubicBezier::linear(), duration, ticks_per_second)
    }

    #[must_use]
    pub fn samples(&self) -> &CurveSamples {
        &self.samples
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Number of ticks a transition on this curve takes.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len()
    }
}

/// Frame-stepped transition controller with a one-shot close payload.
pub struct Transition<C> {
    samples: CurveSamples,
    state: TransitionState,
    frame: usize,
    on_complete: Option<C>,
    last: Option<TransitionFrame>,
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("state", &self.state)
            .field("frame", &self.frame)
            .field("len", &self.samples.len())
            .field("pending_completion", &self.on_complete.is_some())
            .finish()
    }
}

impl<C> Transition<C> {
    /// Create an idle transition over `samples`.
    #[must_use]
    pub fn new(samples: CurveSamples) -> Self {
        Self {
            samples,
            state: TransitionState::Idle,
            frame: 0,
            on_complete: None,
            last: None,
        }
    }

    /// Start (or restart) opening. Any pending close payload is dropped.
    pub fn open(&mut self) {
        if self.on_complete.take().is_some() {
            crate::debug!(frame = self.frame, "close interrupted by open");
        }
        self.frame = 0;
        self.state = TransitionState::Opening;
    }

    /// Start (or restart) closing; `on_complete` is returned when it finishes.
    ///
    /// A payload from an earlier, unfinished `close()` is dropped unreturned.
    pub fn close(&mut self, on_complete: C) {
        if self.on_complete.replace(on_complete).is_some() {
            crate::debug!(frame = self.frame, "pending close superseded");
        }
        self.frame = 0;
        self.state = TransitionState::Closing;
    }

    /// Stop immediately without returning any payload.
    pub fn cancel(&mut self) {
        self.on_complete = None;
        self.state = TransitionState::Idle;
    }

    /// Step one tick.
    pub fn advance(&mut self) -> Advance<C> {
        let closing = match self.state {
            TransitionState::Idle => return Advance::idle(),
            TransitionState::Opening => false,
            TransitionState::Closing => true,
        };

        let frame = self.samples.get(self.frame).map(|point| {
            self.frame += 1;
            if closing {
                TransitionFrame::closing(point.y)
            } else {
                TransitionFrame::opening(point.y)
            }
        });
        if frame.is_some() {
            self.last = frame;
        }

        let mut completed = None;
        if self.frame >= self.samples.len() {
            self.state = TransitionState::Idle;
            if closing {
                completed = self.on_complete.take();
            }
            crate::trace!(closing, frames = self.frame, "transition finished");
        }
        Advance { frame, completed }
    }

    #[must_use]
    pub fn state(&self) -> TransitionState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state != TransitionState::Idle
    }

    /// Current cursor position.
    #[must_use]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Total number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recently produced frame values.
    #[must_use]
    pub fn last_frame(&self) -> Option<TransitionFrame> {
        self.last
    }

    #[must_use]
    pub fn has_pending_completion(&self) -> bool {
        self.on_complete.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurvePoint;

    fn ramp(len: usize) -> CurveSamples {
        let points = (0..len)
            .map(|i| {
                let v = (i + 1) as f64 / len as f64;
                CurvePoint::new(v, v)
            })
            .collect();
        CurveSamples::from_points(points)
    }

    #[test]
    fn idle_transition_produces_nothing() {
        let mut t: Transition<()> = Transition::new(ramp(3));
        let step = t.advance();
        assert!(step.frame.is_none());
        assert!(step.completed.is_none());
    }

    #[test]
    fn open_walks_every_sample_then_idles() {
        let mut t: Transition<()> = Transition::new(ramp(4));
        t.open();
        let mut frames = Vec::new();
        while t.is_running() {
            let step = t.advance();
            assert!(step.completed.is_none());
            frames.push(step.frame.unwrap());
        }
        assert_eq!(frames.len(), 4);
        assert_eq!(t.frame(), 4);
        assert!((frames[3].opacity - 1.0).abs() < 1e-12);
        assert!((frames[3].scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn opening_mapping() {
        let f = TransitionFrame::opening(0.5);
        assert_eq!(f.opacity, 0.5);
        assert!((f.scale - 0.7).abs() < 1e-12);
    }

    #[test]
    fn closing_mapping_is_inverse() {
        let f = TransitionFrame::closing(1.0);
        assert_eq!(f.opacity, 0.0);
        assert!((f.scale - 0.4).abs() < 1e-12);
    }

    #[test]
    fn close_completes_on_last_sample() {
        let mut t = Transition::new(ramp(3));
        t.close("done");
        assert!(t.advance().completed.is_none());
        assert!(t.advance().completed.is_none());
        let last = t.advance();
        assert_eq!(last.completed, Some("done"));
        assert!(last.frame.is_some());
        assert_eq!(t.state(), TransitionState::Idle);
        assert!(t.advance().completed.is_none());
    }

    #[test]
    fn second_close_supersedes_first() {
        let mut t = Transition::new(ramp(5));
        t.close(1);
        t.advance();
        t.advance();
        t.close(2);
        assert_eq!(t.frame(), 0);

        let mut fired = Vec::new();
        for _ in 0..20 {
            if let Some(id) = t.advance().completed {
                fired.push(id);
            }
        }
        assert_eq!(fired, vec![2]);
    }

    #[test]
    fn open_drops_pending_close() {
        let mut t = Transition::new(ramp(2));
        t.close(7);
        t.open();
        assert!(!t.has_pending_completion());
        assert!(t.advance().completed.is_none());
        assert!(t.advance().completed.is_none());
        assert!(!t.is_running());
    }

    #[test]
    fn cancel_never_fires() {
        let mut t = Transition::new(ramp(2));
        t.close(());
        t.advance();
        t.cancel();
        assert!(t.advance().completed.is_none());
        assert_eq!(t.state(), TransitionState::Idle);
    }

    #[test]
    fn empty_curve_completes_on_first_advance() {
        let mut t = Transition::new(CurveSamples::from_points(Vec::new()));
        t.close('x');
        let step = t.advance();
        assert!(step.frame.is_none());
        assert_eq!(step.completed, Some('x'));
    }

    #[test]
    fn timed_curve_resolution_follows_rate() {
        let curve = TransitionCurve::fade(Duration::from_millis(500), 60).unwrap();
        assert!(curve.frames() == 30 || curve.frames() == 31);
        assert_eq!(curve.duration(), Duration::from_millis(500));

        let short = TransitionCurve::fade(Duration::from_millis(1), 60).unwrap();
        assert_eq!(short.frames(), 5);
    }

    #[test]
    fn timed_curve_rejects_zero_rate() {
        assert!(TransitionCurve::fade(Duration::from_secs(1), 0).is_err());
    }
}
