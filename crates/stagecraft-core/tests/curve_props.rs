//! Property-based invariants for curve sampling.
//!
//! 1. The first sample is the origin for any valid input.
//! 2. Building twice yields identical sequences.
//! 3. The sample count is `resolution` or `resolution + 1`.
//! 4. `amplify` scales every point and never changes the count.
//! 5. Out-of-range resolution or amplify never panics; it is rejected.

use proptest::prelude::*;
use stagecraft_core::curve::{CubicBezier, CurvePoint};
use stagecraft_core::error::EngineError;

fn control() -> impl Strategy<Value = f64> {
    -2.0f64..3.0
}

proptest! {
    #[test]
    fn first_sample_is_origin(
        x1 in control(), y1 in control(), x2 in control(), y2 in control(),
        resolution in 4u32..2000,
    ) {
        let samples = CubicBezier::new(x1, y1, x2, y2).resolution(resolution).build().unwrap();
        prop_assert_eq!(samples.first(), Some(CurvePoint::ORIGIN));
    }

    #[test]
    fn build_is_deterministic(
        x1 in control(), y1 in control(), x2 in control(), y2 in control(),
        resolution in 4u32..500,
    ) {
        let curve = CubicBezier::new(x1, y1, x2, y2).resolution(resolution);
        let a = curve.build().unwrap();
        let b = curve.build().unwrap();
        prop_assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn length_tracks_resolution(resolution in 4u32..5000) {
        let samples = CubicBezier::dialog().resolution(resolution).build().unwrap();
        let len = samples.len() as u32;
        prop_assert!(len == resolution || len == resolution + 1, "resolution={resolution} len={len}");
    }

    #[test]
    fn amplify_scales_points(resolution in 4u32..200, amplify in 1u32..50) {
        let base = CubicBezier::linear().resolution(resolution).build().unwrap();
        let scaled = CubicBezier::linear().resolution(resolution).amplify(amplify).build().unwrap();
        prop_assert_eq!(base.len(), scaled.len());
        let factor = f64::from(amplify);
        for (a, b) in base.iter().zip(scaled.iter()) {
            prop_assert!((a.y * factor - b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_inputs_are_rejected(resolution in 0u32..4) {
        let err = CubicBezier::linear().resolution(resolution).build().unwrap_err();
        prop_assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}

#[test]
fn dialog_curve_is_stable_across_builds() {
    let first = CubicBezier::dialog().build().unwrap();
    for _ in 0..10 {
        let again = CubicBezier::dialog().build().unwrap();
        assert_eq!(first, again);
    }
    assert_eq!(first.len(), 13);
}
