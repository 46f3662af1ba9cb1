#![forbid(unsafe_code)]

//! Runtime: the frame clock, the diagnostics sampler, and the [`Stage`]
//! that orchestrates views and dialogs on top of them.
//!
//! # Usage
//!
//! ```
//! use stagecraft_runtime::{EngineConfig, Stage, View};
//!
//! struct Home;
//! impl View for Home {}
//!
//! let mut stage = Stage::new(EngineConfig::default()).unwrap();
//! stage.register_view("home", Home).unwrap();
//! stage.switch_to("home").unwrap();
//! stage.start();
//! stage.pulse(0);
//! assert_eq!(stage.pulse(20_000_000), 1);
//! ```

pub mod app;
pub mod clock;
pub mod config;
pub mod debug_trace;
pub mod diagnostics;
pub mod dialog;
pub mod stage;
pub mod view;

pub use app::App;
pub use clock::{FrameClock, FrameStats, Tick};
pub use config::EngineConfig;
pub use diagnostics::{
    DiagnosticsSampler, DiagnosticsText, MemoryProbe, MemorySnapshot, ProcessMemoryProbe, Sampler,
};
pub use dialog::{Dialog, DialogSize};
pub use stage::{Layer, Stage, StageEvent};
pub use view::View;

/// Engine name shown in diagnostics.
pub const NAME: &str = "Stagecraft";

/// Engine version shown in diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
