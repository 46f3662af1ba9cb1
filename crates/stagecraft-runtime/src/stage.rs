#![forbid(unsafe_code)]

//! The presentation orchestrator.
//!
//! A [`Stage`] owns the view and dialog registries, the active view and
//! active dialog slots, the display stack, and the [`FrameClock`] that
//! drives them. The host feeds it pulses; everything else (transition
//! stepping, per-tick updates, lifecycle hooks) happens inside
//! [`Stage::pulse`] on the caller's thread.
//!
//! # View switching
//!
//! [`switch_view`](Stage::switch_view) hands the active slot to the new view
//! at once, then:
//!
//! - the outgoing view plays its hide transition (or leaves immediately when
//!   it has none) and gets `on_hide` once it is off the stack;
//! - with `overlap`, the incoming view is inserted beneath everything right
//!   away, so it is revealed while the outgoing one fades;
//! - without `overlap`, the incoming view waits for the exit to finish and
//!   is then placed on top of the other views.
//!
//! A second switch while a view is still waiting replaces the waiting view;
//! it never appears and gets no hooks.
//!
//! # Dialogs
//!
//! At most one dialog is active. Showing a dialog while another is active
//! closes the current one first and activates the new one when the close
//! transition completes. A further request during that close restarts it
//! with the newer target, so only the latest request is honored.
//!
//! # Events
//!
//! Listeners registered with [`on_event`](Stage::on_event) see every slot
//! change before the display stack is touched.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use stagecraft_core::curve::{CubicBezier, CurveSamples};
use stagecraft_core::error::{EngineError, EngineResult};
use stagecraft_core::transition::Transition;

use crate::app::App;
use crate::clock::FrameClock;
use crate::config::EngineConfig;
use crate::diagnostics::{
    DiagnosticsSampler, DiagnosticsText, MemoryProbe, ProcessMemoryProbe, SAMPLE_PERIOD, Sampler,
};
use crate::dialog::{Dialog, DialogExit, DialogSize};
use crate::view::View;

/// One entry of the display stack, bottom to top.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Layer {
    View(String),
    Dialog(String),
    DebugOverlay,
}

impl Layer {
    fn is_view(&self, name: &str) -> bool {
        matches!(self, Self::View(n) if n == name)
    }

    fn is_dialog(&self, name: &str) -> bool {
        matches!(self, Self::Dialog(n) if n == name)
    }
}

/// Slot changes reported to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    ViewChanged {
        from: Option<String>,
        to: String,
    },
    DialogChanged {
        from: Option<String>,
        to: Option<String>,
    },
}

type Listener = Box<dyn FnMut(&StageEvent)>;

/// A view with a show or hide transition in flight.
struct Motion {
    name: String,
    transition: Transition<()>,
}

/// A sequential incoming view waiting on an exit.
#[derive(Debug)]
struct Waiting {
    name: String,
    behind: String,
}

pub struct Stage {
    config: EngineConfig,
    clock: FrameClock,
    dialog_curve: CurveSamples,
    views: BTreeMap<String, Box<dyn View>>,
    dialogs: BTreeMap<String, Dialog>,
    active_view: Option<String>,
    active_dialog: Option<String>,
    layers: Vec<Layer>,
    entering: Vec<Motion>,
    exiting: Vec<Motion>,
    waiting: Option<Waiting>,
    listeners: Vec<Listener>,
    diagnostics: DiagnosticsText,
    sampler: Option<DiagnosticsSampler>,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("views", &self.views.keys().collect::<Vec<_>>())
            .field("dialogs", &self.dialogs.keys().collect::<Vec<_>>())
            .field("active_view", &self.active_view)
            .field("active_dialog", &self.active_dialog)
            .field("layers", &self.layers)
            .field("waiting", &self.waiting)
            .finish_non_exhaustive()
    }
}

impl Stage {
    /// A stage with an empty registry and a stopped clock.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let clock = FrameClock::from_config(&config)?;
        let dialog_curve = CubicBezier::dialog().build()?;
        let mut layers = Vec::new();
        if config.debug {
            layers.push(Layer::DebugOverlay);
        }
        Ok(Self {
            config,
            clock,
            dialog_curve,
            views: BTreeMap::new(),
            dialogs: BTreeMap::new(),
            active_view: None,
            active_dialog: None,
            layers,
            entering: Vec::new(),
            exiting: Vec::new(),
            waiting: None,
            listeners: Vec::new(),
            diagnostics: DiagnosticsText::new(),
            sampler: None,
        })
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register (or replace) a view under `name`.
    ///
    /// Fails with [`EngineError::Conflict`] if `name` is active or still on
    /// the display stack.
    pub fn register_view(
        &mut self,
        name: impl Into<String>,
        view: impl View + 'static,
    ) -> EngineResult<()> {
        let name = name.into();
        if self.view_in_use(&name) {
            return Err(EngineError::conflict(format!(
                "view {name:?} is in use and cannot be replaced"
            )));
        }
        tracing::debug!(view = %name, "view registered");
        self.views.insert(name, Box::new(view));
        Ok(())
    }

    pub fn unregister_view(&mut self, name: &str) -> EngineResult<Box<dyn View>> {
        if !self.views.contains_key(name) {
            return Err(EngineError::not_found(format!("view {name:?}")));
        }
        if self.view_in_use(name) {
            return Err(EngineError::conflict(format!("view {name:?} is in use")));
        }
        self.views
            .remove(name)
            .ok_or_else(|| EngineError::not_found(format!("view {name:?}")))
    }

    /// Register (or replace) a dialog whose content is built by `factory`.
    pub fn register_dialog<V, F>(
        &mut self,
        name: impl Into<String>,
        size: DialogSize,
        factory: F,
    ) -> EngineResult<()>
    where
        V: View + 'static,
        F: FnOnce() -> V,
    {
        let name = name.into();
        if self.active_dialog.as_deref() == Some(name.as_str()) {
            return Err(EngineError::conflict(format!(
                "dialog {name:?} is active and cannot be replaced"
            )));
        }
        let dialog = Dialog::new(size, self.dialog_curve.clone(), factory);
        tracing::debug!(dialog = %name, %size, "dialog registered");
        self.dialogs.insert(name, dialog);
        Ok(())
    }

    pub fn unregister_dialog(&mut self, name: &str) -> EngineResult<Dialog> {
        if self.active_dialog.as_deref() == Some(name) {
            return Err(EngineError::conflict(format!("dialog {name:?} is active")));
        }
        self.dialogs
            .remove(name)
            .ok_or_else(|| EngineError::not_found(format!("dialog {name:?}")))
    }

    /// Replace the curve used by dialogs registered from now on.
    pub fn set_dialog_curve(&mut self, curve: CubicBezier) -> EngineResult<()> {
        self.dialog_curve = curve.build()?;
        Ok(())
    }

    fn view_in_use(&self, name: &str) -> bool {
        self.active_view.as_deref() == Some(name)
            || self.layers.iter().any(|l| l.is_view(name))
            || self.waiting.as_ref().is_some_and(|w| w.name == name)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Make `name` the active view using the configured ordering.
    pub fn switch_to(&mut self, name: &str) -> EngineResult<()> {
        self.switch_view(name, self.config.overlap_order)
    }

    /// Make `name` the active view.
    ///
    /// With `overlap` the incoming view is inserted beneath the outgoing one
    /// before its hide transition finishes; otherwise it is added only after.
    pub fn switch_view(&mut self, name: &str, overlap: bool) -> EngineResult<()> {
        if !self.views.contains_key(name) {
            return Err(EngineError::not_found(format!("view {name:?}")));
        }
        if self.active_view.as_deref() == Some(name) {
            return Ok(());
        }

        let previous = self.active_view.replace(name.to_owned());
        crate::debug_trace!("view switch: {:?} -> {} (overlap={})", previous, name, overlap);
        tracing::debug!(from = ?previous, to = name, overlap, "switching view");
        self.notify(StageEvent::ViewChanged {
            from: previous.clone(),
            to: name.to_owned(),
        });

        if let Some(waiting) = self.waiting.take() {
            tracing::debug!(dropped = %waiting.name, "waiting view replaced");
            if overlap {
                self.enter_view(name, true);
            } else {
                self.waiting = Some(Waiting {
                    name: name.to_owned(),
                    behind: waiting.behind,
                });
            }
        } else if let Some(previous) = previous {
            self.leave_view(&previous, name, overlap);
        } else {
            self.enter_view(name, overlap);
        }
        self.raise_overlay();
        Ok(())
    }

    fn leave_view(&mut self, outgoing: &str, incoming: &str, overlap: bool) {
        self.entering.retain(|m| m.name != outgoing);
        let hide = self
            .views
            .get(outgoing)
            .and_then(|view| view.hide_transition());
        match hide {
            Some(curve) => {
                let mut transition = Transition::new(curve.samples().clone());
                transition.close(());
                self.exiting.push(Motion {
                    name: outgoing.to_owned(),
                    transition,
                });
                if overlap {
                    self.enter_view(incoming, true);
                } else {
                    self.waiting = Some(Waiting {
                        name: incoming.to_owned(),
                        behind: outgoing.to_owned(),
                    });
                }
            }
            None => {
                self.dismiss_view(outgoing);
                self.enter_view(incoming, overlap);
            }
        }
    }

    /// Put `name` on the stack, fire `on_show`, and start its show transition.
    fn enter_view(&mut self, name: &str, beneath: bool) {
        // Re-entering a view that is still fading out ends that exit first.
        if let Some(pos) = self.exiting.iter().position(|m| m.name == name) {
            self.exiting.remove(pos);
            self.dismiss_view(name);
        }

        let layer = Layer::View(name.to_owned());
        if beneath {
            self.layers.insert(0, layer);
        } else {
            let top_of_views = self
                .layers
                .iter()
                .position(|l| !matches!(l, Layer::View(_)))
                .unwrap_or(self.layers.len());
            self.layers.insert(top_of_views, layer);
        }
        self.raise_overlay();

        let Some(view) = self.views.get_mut(name) else {
            return;
        };
        view.on_show();
        if let Some(curve) = view.show_transition() {
            let mut transition = Transition::new(curve.samples().clone());
            transition.open();
            self.entering.push(Motion {
                name: name.to_owned(),
                transition,
            });
        }
    }

    /// Fire `on_hide` and take `name` off the stack.
    fn dismiss_view(&mut self, name: &str) {
        if let Some(view) = self.views.get_mut(name) {
            view.on_hide();
        }
        self.layers.retain(|l| !l.is_view(name));
    }

    fn finish_exit(&mut self, name: &str) {
        tracing::trace!(view = name, "exit transition finished");
        self.dismiss_view(name);
        if self.waiting.as_ref().is_some_and(|w| w.behind == name)
            && let Some(waiting) = self.waiting.take()
        {
            self.enter_view(&waiting.name, false);
            self.raise_overlay();
        }
    }

    fn step_view_transitions(&mut self) {
        let views = &mut self.views;
        self.entering.retain_mut(|motion| {
            let step = motion.transition.advance();
            if let (Some(frame), Some(view)) = (step.frame, views.get_mut(&motion.name)) {
                view.on_transition(frame);
            }
            motion.transition.is_running()
        });

        let mut finished = Vec::new();
        self.exiting.retain_mut(|motion| {
            let step = motion.transition.advance();
            if let (Some(frame), Some(view)) = (step.frame, views.get_mut(&motion.name)) {
                view.on_transition(frame);
            }
            if step.completed.is_some() || !motion.transition.is_running() {
                finished.push(motion.name.clone());
                false
            } else {
                true
            }
        });
        for name in finished {
            self.finish_exit(&name);
        }
    }

    // ========================================================================
    // Dialogs
    // ========================================================================

    /// Show dialog `name`, closing the active dialog first if there is one.
    pub fn show_dialog(&mut self, name: &str) -> EngineResult<()> {
        if !self.dialogs.contains_key(name) {
            return Err(EngineError::not_found(format!("dialog {name:?}")));
        }
        match self.active_dialog.clone() {
            Some(current) => {
                tracing::debug!(from = %current, to = name, "dialog handoff requested");
                if let Some(dialog) = self.dialogs.get_mut(&current) {
                    dialog.close(DialogExit::Show(name.to_owned()));
                }
            }
            None => {
                self.notify(StageEvent::DialogChanged {
                    from: None,
                    to: Some(name.to_owned()),
                });
                self.activate_dialog(name);
            }
        }
        Ok(())
    }

    /// Close the active dialog. Returns `false` when none is active.
    ///
    /// Supersedes any pending handoff started by [`show_dialog`](Self::show_dialog).
    pub fn close_dialog(&mut self) -> bool {
        let Some(current) = self.active_dialog.as_deref() else {
            return false;
        };
        match self.dialogs.get_mut(current) {
            Some(dialog) => {
                dialog.close(DialogExit::Clear);
                true
            }
            None => false,
        }
    }

    fn activate_dialog(&mut self, name: &str) {
        let Some(dialog) = self.dialogs.get_mut(name) else {
            return;
        };
        crate::debug_trace!("dialog activated: {}", name);
        let below_overlay = self
            .layers
            .iter()
            .position(|l| *l == Layer::DebugOverlay)
            .unwrap_or(self.layers.len());
        self.layers
            .insert(below_overlay, Layer::Dialog(name.to_owned()));
        self.active_dialog = Some(name.to_owned());
        dialog.open();
        dialog.content_mut().on_show();
        self.raise_overlay();
    }

    fn finish_dialog(&mut self, name: &str, exit: DialogExit) {
        let next = match exit {
            DialogExit::Show(next) if self.dialogs.contains_key(&next) => Some(next),
            DialogExit::Show(next) => {
                tracing::warn!(dialog = %next, "dialog unregistered before it could open");
                None
            }
            DialogExit::Clear => None,
        };
        self.notify(StageEvent::DialogChanged {
            from: Some(name.to_owned()),
            to: next.clone(),
        });

        self.layers.retain(|l| !l.is_dialog(name));
        if let Some(dialog) = self.dialogs.get_mut(name) {
            dialog.content_mut().on_hide();
        }
        self.active_dialog = None;
        if let Some(next) = next {
            self.activate_dialog(&next);
        }
    }

    fn step_dialog(&mut self, delta_nanos: f64) {
        let Some(name) = self.active_dialog.clone() else {
            return;
        };
        let exit = match self.dialogs.get_mut(&name) {
            Some(dialog) => dialog.tick(delta_nanos),
            None => None,
        };
        if let Some(exit) = exit {
            self.finish_dialog(&name, exit);
        }
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Start the clock, firing `on_start` on every registered view and dialog.
    ///
    /// Returns `false` without firing anything when already running.
    pub fn start(&mut self) -> bool {
        let views = &mut self.views;
        let dialogs = &mut self.dialogs;
        self.clock.start(|| {
            views.values_mut().for_each(|v| v.on_start());
            dialogs.values_mut().for_each(|d| d.content_mut().on_start());
        })
    }

    /// Stop the clock, firing `on_stop` on every registered view and dialog.
    pub fn stop(&mut self) -> bool {
        let views = &mut self.views;
        let dialogs = &mut self.dialogs;
        self.clock.stop(|| {
            views.values_mut().for_each(|v| v.on_stop());
            dialogs.values_mut().for_each(|d| d.content_mut().on_stop());
        })
    }

    /// Feed a host pulse and dispatch the ticks it releases.
    ///
    /// At most [`EngineConfig::max_ticks_per_pulse`] ticks run per call;
    /// debt beyond that is paid off by later pulses. Returns the number of
    /// ticks dispatched.
    pub fn pulse(&mut self, now_nanos: u64) -> usize {
        self.clock.observe(now_nanos);
        let mut dispatched = 0;
        while let Some(tick) = self.clock.next_tick() {
            self.tick(tick.delta_nanos);
            dispatched += 1;
        }
        dispatched
    }

    /// Dispatch one tick directly, bypassing the clock.
    ///
    /// Steps view transitions, updates the active view (once it is on the
    /// stack), then updates and steps the active dialog.
    pub fn tick(&mut self, delta_nanos: f64) {
        self.step_view_transitions();
        if let Some(name) = self.active_view.as_deref()
            && self.waiting.as_ref().is_none_or(|w| w.name != name)
            && let Some(view) = self.views.get_mut(name)
        {
            view.on_update(delta_nanos);
        }
        self.step_dialog(delta_nanos);
    }

    /// Switch between the target and degraded tick rate.
    pub fn focus_changed(&mut self, focused: bool) {
        self.clock.focus_changed(focused);
    }

    // ========================================================================
    // Debug and diagnostics
    // ========================================================================

    /// Toggle diagnostics sampling and the overlay layer.
    pub fn set_debug(&mut self, enabled: bool) {
        self.config.debug = enabled;
        self.clock.stats().set_debug(enabled);
        if enabled {
            self.raise_overlay();
        } else {
            self.layers.retain(|l| *l != Layer::DebugOverlay);
        }
        tracing::debug!(enabled, "debug overlay toggled");
    }

    /// Move the overlay to the top of the stack, adding it if missing.
    fn raise_overlay(&mut self) {
        if !self.config.debug {
            return;
        }
        if self.layers.last() == Some(&Layer::DebugOverlay) {
            return;
        }
        self.layers.retain(|l| *l != Layer::DebugOverlay);
        self.layers.push(Layer::DebugOverlay);
    }

    /// Start the background sampler. Does nothing if one is running.
    pub fn spawn_diagnostics(&mut self, probe: Box<dyn MemoryProbe>, period: Duration) {
        if self.sampler.as_ref().is_some_and(DiagnosticsSampler::is_running) {
            return;
        }
        let sampler = Sampler::new(
            std::sync::Arc::clone(self.clock.stats()),
            probe,
            self.diagnostics.clone(),
        );
        self.sampler = Some(DiagnosticsSampler::spawn(sampler, period));
    }

    /// Stop the background sampler and wait for it to exit.
    pub fn stop_diagnostics(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.stop();
        }
    }

    /// The observable diagnostics report.
    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticsText {
        &self.diagnostics
    }

    // ========================================================================
    // Application lifecycle
    // ========================================================================

    /// Bring the engine up: `app.on_init`, every `on_launch`, the
    /// diagnostics sampler, the clock, then `app.on_launch`.
    pub fn launch<A: App + ?Sized>(&mut self, app: &mut A) {
        app.on_init(self);
        self.views.values_mut().for_each(|v| v.on_launch());
        self.dialogs
            .values_mut()
            .for_each(|d| d.content_mut().on_launch());
        self.spawn_diagnostics(Box::new(ProcessMemoryProbe::new()), SAMPLE_PERIOD);
        self.start();
        app.on_launch(self);
        tracing::info!(
            engine = crate::NAME,
            version = crate::VERSION,
            rate = self.clock.rate(),
            "stage launched"
        );
    }

    /// Ask `app` whether to shut down; if it agrees, stop everything.
    ///
    /// Returns `false` when the app vetoed.
    pub fn shutdown<A: App + ?Sized>(&mut self, app: &mut A) -> bool {
        if !app.on_shutdown(self) {
            tracing::debug!("shutdown vetoed");
            return false;
        }
        self.stop();
        self.views.values_mut().for_each(|v| v.on_shutdown());
        self.dialogs
            .values_mut()
            .for_each(|d| d.content_mut().on_shutdown());
        self.stop_diagnostics();
        tracing::info!("stage shut down");
        true
    }

    // ========================================================================
    // Events and queries
    // ========================================================================

    /// Register a listener for slot changes.
    pub fn on_event(&mut self, listener: impl FnMut(&StageEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: StageEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    #[must_use]
    pub fn active_view(&self) -> Option<&str> {
        self.active_view.as_deref()
    }

    #[must_use]
    pub fn active_dialog(&self) -> Option<&str> {
        self.active_dialog.as_deref()
    }

    /// The display stack, bottom to top.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn view(&self, name: &str) -> Option<&dyn View> {
        self.views.get(name).map(|v| v.as_ref())
    }

    #[must_use]
    pub fn dialog(&self, name: &str) -> Option<&Dialog> {
        self.dialogs.get(name)
    }

    /// The sequential incoming view still waiting for an exit, if any.
    #[must_use]
    pub fn waiting_view(&self) -> Option<&str> {
        self.waiting.as_ref().map(|w| w.name.as_str())
    }

    /// Whether any view show/hide transition is in flight.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        !self.entering.is_empty() || !self.exiting.is_empty()
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.config.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use stagecraft_core::transition::TransitionCurve;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Tracker {
        name: &'static str,
        log: Log,
        hide: Option<TransitionCurve>,
    }

    impl View for Tracker {
        fn on_show(&mut self) {
            self.log.borrow_mut().push(format!("{}:show", self.name));
        }
        fn on_hide(&mut self) {
            self.log.borrow_mut().push(format!("{}:hide", self.name));
        }
        fn hide_transition(&self) -> Option<TransitionCurve> {
            self.hide.clone()
        }
    }

    fn stage() -> Stage {
        Stage::new(EngineConfig::default()).unwrap()
    }

    fn tracker(name: &'static str, log: &Log) -> Tracker {
        Tracker {
            name,
            log: Rc::clone(log),
            hide: None,
        }
    }

    #[test]
    fn new_rejects_bad_config() {
        let err = Stage::new(EngineConfig::new().with_target_rate(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn switching_to_unknown_view_is_not_found() {
        let mut stage = stage();
        assert!(matches!(
            stage.switch_view("nope", true),
            Err(EngineError::NotFound(_))
        ));
        assert!(stage.active_view().is_none());
    }

    #[test]
    fn switching_to_active_view_is_a_no_op() {
        let log = Log::default();
        let mut stage = stage();
        stage.register_view("a", tracker("a", &log)).unwrap();
        stage.switch_view("a", false).unwrap();
        stage.switch_view("a", false).unwrap();
        assert_eq!(*log.borrow(), vec!["a:show"]);
        assert_eq!(stage.layers(), &[Layer::View("a".into())]);
    }

    #[test]
    fn view_without_hide_curve_leaves_immediately() {
        let log = Log::default();
        let mut stage = stage();
        stage.register_view("a", tracker("a", &log)).unwrap();
        stage.register_view("b", tracker("b", &log)).unwrap();
        stage.switch_view("a", true).unwrap();
        stage.switch_view("b", true).unwrap();
        assert_eq!(*log.borrow(), vec!["a:show", "a:hide", "b:show"]);
        assert_eq!(stage.layers(), &[Layer::View("b".into())]);
    }

    #[test]
    fn overlay_stays_on_top() {
        let log = Log::default();
        let mut stage = stage();
        stage.register_view("a", tracker("a", &log)).unwrap();
        stage.register_dialog("d", DialogSize::S, || tracker("d", &log)).unwrap();
        stage.set_debug(true);
        stage.switch_view("a", false).unwrap();
        stage.show_dialog("d").unwrap();
        assert_eq!(
            stage.layers(),
            &[
                Layer::View("a".into()),
                Layer::Dialog("d".into()),
                Layer::DebugOverlay
            ]
        );
        stage.set_debug(false);
        assert!(!stage.layers().contains(&Layer::DebugOverlay));
        assert!(!stage.clock().stats().is_debug());
    }

    #[test]
    fn active_view_cannot_be_unregistered() {
        let log = Log::default();
        let mut stage = stage();
        stage.register_view("a", tracker("a", &log)).unwrap();
        stage.switch_view("a", true).unwrap();
        assert!(matches!(
            stage.unregister_view("a"),
            Err(EngineError::Conflict(_))
        ));
        assert!(matches!(
            stage.register_view("a", tracker("a", &log)),
            Err(EngineError::Conflict(_))
        ));
        assert!(matches!(
            stage.unregister_view("ghost"),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn close_dialog_without_active_returns_false() {
        let mut stage = stage();
        assert!(!stage.close_dialog());
    }
}
