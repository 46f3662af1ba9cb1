#![forbid(unsafe_code)]

//! Modal dialogs.
//!
//! A [`Dialog`] wraps a content [`View`] built by a factory at registration
//! time, a [`DialogSize`] preset bounding its extent, and a
//! [`Transition`] that opens and closes it. All dialogs of a stage share one
//! sampled curve.

use std::fmt;
use std::str::FromStr;

use stagecraft_core::curve::CurveSamples;
use stagecraft_core::error::EngineError;
use stagecraft_core::transition::{Advance, Transition, TransitionState};

use crate::view::View;

/// Maximum extent presets, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DialogSize {
    S,
    #[default]
    M,
    L,
    Xl,
    Xxl,
    Xxxl,
}

impl DialogSize {
    pub const ALL: [Self; 6] = [Self::S, Self::M, Self::L, Self::Xl, Self::Xxl, Self::Xxxl];

    /// `(width, height)` upper bound.
    #[must_use]
    pub const fn max_size(self) -> (u32, u32) {
        match self {
            Self::S => (380, 240),
            Self::M => (480, 300),
            Self::L => (520, 360),
            Self::Xl => (640, 410),
            Self::Xxl => (760, 520),
            Self::Xxxl => (860, 570),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
            Self::Xxl => "XXL",
            Self::Xxxl => "XXXL",
        }
    }
}

impl fmt::Display for DialogSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialogSize {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::invalid_argument(format!("unknown dialog size: {s:?}")))
    }
}

/// What happens once a closing dialog finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DialogExit {
    /// Activate the named dialog next.
    Show(String),
    /// Leave the dialog slot empty.
    Clear,
}

/// A registered dialog: content view, size preset, and open/close transition.
pub struct Dialog {
    content: Box<dyn View>,
    size: DialogSize,
    transition: Transition<DialogExit>,
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("size", &self.size)
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

impl Dialog {
    /// Build the content with `factory` and pair it with `curve`.
    pub fn new<V, F>(size: DialogSize, curve: CurveSamples, factory: F) -> Self
    where
        V: View + 'static,
        F: FnOnce() -> V,
    {
        Self {
            content: Box::new(factory()),
            size,
            transition: Transition::new(curve),
        }
    }

    #[must_use]
    pub fn size(&self) -> DialogSize {
        self.size
    }

    #[must_use]
    pub fn content(&self) -> &dyn View {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> &mut dyn View {
        self.content.as_mut()
    }

    #[must_use]
    pub fn transition_state(&self) -> TransitionState {
        self.transition.state()
    }

    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.transition.state() == TransitionState::Closing
    }

    pub(crate) fn open(&mut self) {
        self.transition.open();
    }

    pub(crate) fn close(&mut self, then: DialogExit) {
        self.transition.close(then);
    }

    /// Update the content, then step the transition and apply its frame.
    pub(crate) fn tick(&mut self, delta_nanos: f64) -> Option<DialogExit> {
        self.content.on_update(delta_nanos);
        let Advance { frame, completed } = self.transition.advance();
        if let Some(frame) = frame {
            self.content.on_transition(frame);
        }
        completed
    }
}
