#![forbid(unsafe_code)]

//! Stagecraft public facade crate.
//!
//! Re-exports the curve, transition, clock, and stage types from the
//! internal crates and offers a prelude for day-to-day use.
//!
//! ```
//! use stagecraft::prelude::*;
//!
//! struct Splash;
//! impl View for Splash {}
//!
//! let mut stage = Stage::new(EngineConfig::default()).unwrap();
//! stage.register_view("splash", Splash).unwrap();
//! stage.switch_to("splash").unwrap();
//! assert_eq!(stage.active_view(), Some("splash"));
//! ```

// --- Core re-exports -------------------------------------------------------

pub use stagecraft_core::curve::{CubicBezier, CurvePoint, CurveSamples};
pub use stagecraft_core::error::{EngineError, EngineResult};
pub use stagecraft_core::transition::{
    Advance, Transition, TransitionCurve, TransitionFrame, TransitionState,
};

// --- Runtime re-exports ----------------------------------------------------

pub use stagecraft_runtime::{
    App, DiagnosticsText, Dialog, DialogSize, EngineConfig, FrameClock, FrameStats, Layer,
    MemoryProbe, MemorySnapshot, NAME, Stage, StageEvent, Tick, VERSION, View,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        App, CubicBezier, DialogSize, EngineConfig, EngineError, EngineResult, Layer, Stage,
        StageEvent, TransitionCurve, TransitionFrame, View,
    };

    pub use crate::{core, runtime};
}

pub use stagecraft_core as core;
pub use stagecraft_runtime as runtime;
