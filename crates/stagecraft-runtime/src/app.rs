#![forbid(unsafe_code)]

//! Host application hooks.

use crate::stage::Stage;

/// Callbacks a host application supplies to [`Stage::launch`] and
/// [`Stage::shutdown`].
///
/// `on_init` is the place to register views and dialogs; `on_launch` runs
/// once the clock is running and usually switches to the first view.
pub trait App {
    fn on_init(&mut self, stage: &mut Stage) {
        let _ = stage;
    }

    fn on_launch(&mut self, stage: &mut Stage);

    /// Return `false` to veto the shutdown.
    fn on_shutdown(&mut self, stage: &mut Stage) -> bool {
        let _ = stage;
        true
    }
}
