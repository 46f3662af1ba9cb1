#![forbid(unsafe_code)]

//! Core: easing curve sampling, transition controllers, and the shared error type.
//!
//! Nothing in this crate owns a clock or a thread. Curves are built once and
//! shared read-only; transitions are advanced one tick at a time by whoever
//! owns the frame loop (normally `stagecraft-runtime`).

pub mod curve;
pub mod error;
pub mod logging;
pub mod transition;

pub use curve::{CubicBezier, CurvePoint, CurveSamples};
pub use error::{EngineError, EngineResult};
pub use transition::{Advance, Transition, TransitionCurve, TransitionFrame, TransitionState};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
