#![forbid(unsafe_code)]

//! Cubic easing curves sampled into point sequences.
//!
//! A [`CubicBezier`] describes a CSS-style timing curve: the anchors are fixed
//! at `(0, 0)` and `(1, 1)` and the caller supplies the two inner control
//! points. [`CubicBezier::build`] evaluates the curve with de Casteljau's
//! algorithm and returns an immutable [`CurveSamples`] that many transitions
//! can share.
//!
//! # Usage
//!
//! ```
//! use stagecraft_core::curve::CubicBezier;
//!
//! // Fast start, slow finish, 120 steps.
//! let samples = CubicBezier::new(0.23, 1.0, 0.32, 1.0)
//!     .resolution(120)
//!     .build()
//!     .unwrap();
//! assert_eq!(samples.first().map(|p| (p.x, p.y)), Some((0.0, 0.0)));
//! ```
//!
//! # Invariants
//!
//! 1. The first sample is always the start anchor (scaled by `amplify`, so `(0, 0)`).
//! 2. Sampling is deterministic: identical inputs yield identical sequences.
//! 3. The parameter is advanced by a single-precision accumulator, so whether
//!    `t = 1` is reached depends on rounding. For the resolutions animations
//!    use (up to a few thousand) the length is `resolution` or
//!    `resolution + 1`; consumers use that length as the frame count.
//!
//! # Failure Modes
//!
//! - `resolution < 4` or above [`CubicBezier::MAX_RESOLUTION`]:
//!   [`EngineError::InvalidArgument`]. The upper bound keeps the step well
//!   above `f32` precision so the accumulator always reaches 1.
//! - `amplify < 1`: [`EngineError::InvalidArgument`].
//! - Non-finite control coordinates: [`EngineError::InvalidArgument`].

use std::ops::Index;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};

/// A sampled point on an easing curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    /// The fixed start anchor.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };
    /// The fixed end anchor.
    pub const END: Self = Self { x: 1.0, y: 1.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Self, u: f64, t: f64) -> Self {
        Self {
            x: u * self.x + t * other.x,
            y: u * self.y + t * other.y,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// An immutable, cheaply clonable sequence of curve samples.
///
/// Clones share the same allocation, so one built curve can back any number
/// of concurrent transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSamples {
    points: Arc<[CurvePoint]>,
}

impl CurveSamples {
    /// Wrap an explicit point sequence.
    #[must_use]
    pub fn from_points(points: Vec<CurvePoint>) -> Self {
        Self {
            points: points.into(),
        }
    }

    /// Number of samples. This is the frame count of a transition using the curve.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<CurvePoint> {
        self.points.get(index).copied()
    }

    #[must_use]
    pub fn first(&self) -> Option<CurvePoint> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<CurvePoint> {
        self.points.last().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = CurvePoint> + '_ {
        self.points.iter().copied()
    }

    /// Whether two handles share one allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }
}

impl Index<usize> for CurveSamples {
    type Output = CurvePoint;

    fn index(&self, index: usize) -> &CurvePoint {
        &self.points[index]
    }
}

/// Builder for a cubic easing curve anchored at `(0, 0)` and `(1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    p1: CurvePoint,
    p2: CurvePoint,
    resolution: u32,
    amplify: u32,
}

impl CubicBezier {
    /// Smallest accepted resolution.
    pub const MIN_RESOLUTION: u32 = 4;
    /// Largest accepted resolution.
    pub const MAX_RESOLUTION: u32 = 1_000_000;
    /// Resolution used when none is set.
    pub const DEFAULT_RESOLUTION: u32 = 100;

    /// Create a curve from the two inner control points `(x1, y1)` and `(x2, y2)`.
    ///
    /// Coordinates may leave `[0, 1]`; a `y` above 1 produces overshoot.
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            p1: CurvePoint::new(x1, y1),
            p2: CurvePoint::new(x2, y2),
            resolution: Self::DEFAULT_RESOLUTION,
            amplify: 1,
        }
    }

    /// The curve dialogs open and close with: `(.08, .82), (.17, 1)` at 12 steps.
    #[must_use]
    pub const fn dialog() -> Self {
        Self::new(0.08, 0.82, 0.17, 1.0).resolution(12)
    }

    /// A straight line from `(0, 0)` to `(1, 1)`.
    #[must_use]
    pub const fn linear() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Set the number of parameter steps (builder). Validated by [`build`](Self::build).
    #[must_use]
    pub const fn resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the scale applied to every sampled point (builder).
    /// Validated by [`build`](Self::build).
    #[must_use]
    pub const fn amplify(mut self, amplify: u32) -> Self {
        self.amplify = amplify;
        self
    }

    #[must_use]
    pub const fn control_points(&self) -> (CurvePoint, CurvePoint) {
        (self.p1, self.p2)
    }

    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.resolution
    }

    /// Sample the curve.
    pub fn build(&self) -> EngineResult<CurveSamples> {
        build(self.p1, self.p2, self.resolution, self.amplify)
    }
}

/// Sample the cubic curve `(0,0), p1, p2, (1,1)` at `resolution` uniform steps.
///
/// The parameter is accumulated in `f32` while the step is `f64`, matching the
/// sequence lengths the transition timings were tuned against.
pub fn build(
    p1: CurvePoint,
    p2: CurvePoint,
    resolution: u32,
    amplify: u32,
) -> EngineResult<CurveSamples> {
    if !(CubicBezier::MIN_RESOLUTION..=CubicBezier::MAX_RESOLUTION).contains(&resolution) {
        return Err(EngineError::invalid_argument(format!(
            "curve resolution must be in {}..={}, got {resolution}",
            CubicBezier::MIN_RESOLUTION,
            CubicBezier::MAX_RESOLUTION
        )));
    }
    if amplify < 1 {
        return Err(EngineError::invalid_argument(
            "curve amplify must be >= 1, got 0",
        ));
    }
    if ![p1.x, p1.y, p2.x, p2.y].iter().all(|v| v.is_finite()) {
        return Err(EngineError::invalid_argument(
            "curve control points must be finite",
        ));
    }

    let controls = [CurvePoint::ORIGIN, p1, p2, CurvePoint::END];
    let step = 1.0 / f64::from(resolution);
    let factor = f64::from(amplify);

    let mut points = Vec::with_capacity(resolution as usize + 1);
    let mut t = 0.0_f32;
    while t <= 1.0 {
        points.push(de_casteljau(&controls, t).scaled(factor));
        t = (f64::from(t) + step) as f32;
    }

    crate::trace!(
        resolution,
        amplify,
        samples = points.len(),
        "built easing curve"
    );
    Ok(CurveSamples::from_points(points))
}

/// Evaluate a cubic curve at `t` by three passes of linear interpolation.
fn de_casteljau(controls: &[CurvePoint; 4], t: f32) -> CurvePoint {
    let u = f64::from(1.0 - t);
    let t = f64::from(t);
    let mut p = *controls;
    for pass in 1..p.len() {
        for j in 0..p.len() - pass {
            p[j] = p[j].lerp(p[j + 1], u, t);
        }
    }
    p[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_origin() {
        let samples = CubicBezier::new(0.3, 0.9, 0.6, 0.2).build().unwrap();
        assert_eq!(samples.first(), Some(CurvePoint::ORIGIN));
    }

    #[test]
    fn exact_step_reaches_end_anchor() {
        // 1/4 is exact in binary, so t lands on 1.0.
        let samples = CubicBezier::linear().resolution(4).build().unwrap();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples.last(), Some(CurvePoint::END));
    }

    #[test]
    fn inexact_step_can_drop_end_anchor() {
        let samples = CubicBezier::dialog().resolution(10).build().unwrap();
        assert_eq!(samples.len(), 10);
        assert!(samples.last().unwrap().y < 1.0);
    }

    #[test]
    fn dialog_curve_reference() {
        let samples = CubicBezier::dialog().build().unwrap();
        assert_eq!(samples.len(), 13);
        let last = samples.last().unwrap();
        assert!((last.y - 0.999_999_999_999_992_3).abs() < 1e-12, "y = {}", last.y);
        assert!((last.x - 0.999_999_703_168_900_5).abs() < 1e-9, "x = {}", last.x);
        assert!((samples[6].y - 0.8075).abs() < 1e-9);
    }

    #[test]
    fn amplify_scales_both_axes() {
        let base = CubicBezier::dialog().build().unwrap();
        let amped = CubicBezier::dialog().amplify(3).build().unwrap();
        assert_eq!(base.len(), amped.len());
        for (a, b) in base.iter().zip(amped.iter()) {
            assert!((a.x * 3.0 - b.x).abs() < 1e-12);
            assert!((a.y * 3.0 - b.y).abs() < 1e-12);
        }
    }

    #[test]
    fn overshooting_control_point_exceeds_one() {
        let samples = CubicBezier::new(0.3, 1.6, 0.6, 1.4)
            .resolution(50)
            .build()
            .unwrap();
        let peak = samples.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!(peak > 1.0, "peak = {peak}");
    }

    #[test]
    fn resolution_below_minimum_is_rejected() {
        let err = CubicBezier::linear().resolution(3).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn resolution_above_maximum_is_rejected() {
        let err = CubicBezier::linear()
            .resolution(CubicBezier::MAX_RESOLUTION + 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn zero_amplify_is_rejected() {
        let err = CubicBezier::linear().amplify(0).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn non_finite_control_point_is_rejected() {
        let err = CubicBezier::new(f64::NAN, 0.0, 1.0, 1.0).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn clones_share_storage() {
        let samples = CubicBezier::dialog().build().unwrap();
        let shared = samples.clone();
        assert!(samples.ptr_eq(&shared));
    }
}
