#![forbid(unsafe_code)]

//! The view contract.
//!
//! A view is anything the [`Stage`](crate::stage::Stage) can place on its
//! display stack: a full-screen page or the content panel of a dialog. Every
//! hook has an empty default so implementors override only what they use.
//!
//! Lifecycle per registered view: `on_launch` once at engine launch,
//! `on_start`/`on_stop` whenever the frame clock starts or stops,
//! `on_show`/`on_hide` in matched pairs around each stay on the display
//! stack, `on_update` on every tick while active, and `on_shutdown` once.

use stagecraft_core::transition::{TransitionCurve, TransitionFrame};

pub trait View {
    fn on_launch(&mut self) {}

    fn on_shutdown(&mut self) {}

    /// The view was added to the display stack.
    fn on_show(&mut self) {}

    /// The view left the display stack (after its hide transition).
    fn on_hide(&mut self) {}

    fn on_start(&mut self) {}

    fn on_stop(&mut self) {}

    /// One tick while active. `delta_nanos` is the clock's accumulated debt.
    fn on_update(&mut self, delta_nanos: f64) {
        let _ = delta_nanos;
    }

    /// Opacity and scale for one tick of a running show/hide transition.
    fn on_transition(&mut self, frame: TransitionFrame) {
        let _ = frame;
    }

    /// Curve played when the view enters. `None` shows it at once.
    fn show_transition(&self) -> Option<TransitionCurve> {
        None
    }

    /// Curve played before the view leaves. `None` removes it at once.
    fn hide_transition(&self) -> Option<TransitionCurve> {
        None
    }
}

impl<V: View + ?Sized> View for Box<V> {
    fn on_launch(&mut self) {
        (**self).on_launch();
    }
    fn on_shutdown(&mut self) {
        (**self).on_shutdown();
    }
    fn on_show(&mut self) {
        (**self).on_show();
    }
    fn on_hide(&mut self) {
        (**self).on_hide();
    }
    fn on_start(&mut self) {
        (**self).on_start();
    }
    fn on_stop(&mut self) {
        (**self).on_stop();
    }
    fn on_update(&mut self, delta_nanos: f64) {
        (**self).on_update(delta_nanos);
    }
    fn on_transition(&mut self, frame: TransitionFrame) {
        (**self).on_transition(frame);
    }
    fn show_transition(&self) -> Option<TransitionCurve> {
        (**self).show_transition()
    }
    fn hide_transition(&self) -> Option<TransitionCurve> {
        (**self).hide_transition()
    }
}
