#![forbid(unsafe_code)]

//! Background diagnostics sampler.
//!
//! A [`DiagnosticsSampler`] runs on its own thread and wakes on a coarse
//! period (100ms by default). While the shared debug flag is set it reads the
//! [`FrameStats`] the tick path publishes, asks a [`MemoryProbe`] for a
//! memory snapshot, and republishes a multi-line report through
//! [`DiagnosticsText`]. Achieved FPS is the difference of the tick total
//! between every 10th period. The window restarts whenever debug is turned
//! on, so ticks counted while it was off never show up as FPS.
//!
//! The tick path never waits on this thread: it only writes atomics, and
//! the report lives behind a lock the tick path does not touch.
//!
//! # Failure Modes
//!
//! Everything here is best effort. Probe errors are logged and reported as
//! zeros; a failed thread spawn leaves the text empty.

use std::fmt::Write as _;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::clock::FrameStats;

/// Default wake-up period of the sampler thread.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// Periods between FPS recomputations.
pub const FPS_WINDOW: u64 = 10;

const BYTES_PER_MB: u64 = 1024 * 1024;

// ============================================================================
// Memory probing
// ============================================================================

/// Process memory figures in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub init: u64,
    pub used: u64,
    pub committed: u64,
    pub max: u64,
}

/// Source of memory figures for the report.
pub trait MemoryProbe: Send {
    fn snapshot(&mut self) -> io::Result<MemorySnapshot>;
}

/// Reads `/proc/self/status` on Linux; reports zeros elsewhere.
///
/// `used` is the resident set, `committed` the virtual size, `max` the peak
/// virtual size, and `init` the resident set at the first successful read.
#[derive(Debug, Default)]
pub struct ProcessMemoryProbe {
    init: Option<u64>,
}

impl ProcessMemoryProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    #[cfg(target_os = "linux")]
    fn snapshot(&mut self) -> io::Result<MemorySnapshot> {
        let status = std::fs::read_to_string("/proc/self/status")?;
        let mut snapshot = parse_proc_status(&status);
        snapshot.init = *self.init.get_or_insert(snapshot.used);
        Ok(snapshot)
    }

    #[cfg(not(target_os = "linux"))]
    fn snapshot(&mut self) -> io::Result<MemorySnapshot> {
        let _ = self.init;
        Ok(MemorySnapshot::default())
    }
}

/// Pull `VmRSS`, `VmSize`, and `VmPeak` (kB) out of a proc status file.
fn parse_proc_status(status: &str) -> MemorySnapshot {
    let mut snapshot = MemorySnapshot::default();
    for line in status.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(kb) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };
        let bytes = kb.saturating_mul(1024);
        match key {
            "VmRSS" => snapshot.used = bytes,
            "VmSize" => snapshot.committed = bytes,
            "VmPeak" => snapshot.max = bytes,
            _ => {}
        }
    }
    snapshot
}

// ============================================================================
// Published text
// ============================================================================

/// Observable diagnostics report.
///
/// Clones share the same value. [`version`](Self::version) increases on
/// every publish so a display widget can skip redraws.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsText {
    inner: Arc<TextCell>,
}

#[derive(Debug, Default)]
struct TextCell {
    text: Mutex<String>,
    version: AtomicU64,
}

impl DiagnosticsText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current report; empty until the first debug sample.
    #[must_use]
    pub fn get(&self) -> String {
        self.inner
            .text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    fn publish(&self, text: String) {
        *self
            .inner
            .text
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = text;
        self.inner.version.fetch_add(1, Ordering::Release);
    }
}

// ============================================================================
// Sampling
// ============================================================================

/// One period's worth of diagnostics work, independent of any thread.
pub struct Sampler {
    stats: Arc<FrameStats>,
    probe: Box<dyn MemoryProbe>,
    text: DiagnosticsText,
    header: String,
    period: u64,
    window_start_ticks: u64,
    fps: u64,
    probe_failed: bool,
    /// Debug state seen by the previous period.
    active: bool,
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("period", &self.period)
            .field("fps", &self.fps)
            .finish()
    }
}

impl Sampler {
    #[must_use]
    pub fn new(
        stats: Arc<FrameStats>,
        probe: Box<dyn MemoryProbe>,
        text: DiagnosticsText,
    ) -> Self {
        Self {
            stats,
            probe,
            text,
            header: format!(
                "{} {}\n{} {}",
                crate::NAME,
                crate::VERSION,
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            period: 0,
            window_start_ticks: 0,
            fps: 0,
            probe_failed: false,
            active: false,
        }
    }

    /// Run one period. Returns whether the report was republished.
    pub fn sample(&mut self) -> bool {
        if !self.stats.is_debug() {
            self.active = false;
            return false;
        }
        let ticks = self.stats.total_ticks();
        if !self.active {
            // Debug just came on: open a fresh window at the current total.
            self.active = true;
            self.window_start_ticks = ticks;
            self.period = 0;
            self.fps = 0;
        } else if self.period % FPS_WINDOW == 0 {
            self.fps = ticks.saturating_sub(self.window_start_ticks);
            self.window_start_ticks = ticks;
        }
        self.period += 1;

        let memory = match self.probe.snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                if !self.probe_failed {
                    tracing::warn!(error = %err, "memory probe failed; reporting zeros");
                    self.probe_failed = true;
                }
                MemorySnapshot::default()
            }
        };

        self.text.publish(self.render(&memory, ticks));
        true
    }

    /// Ticks counted over the last FPS window.
    #[must_use]
    pub fn fps(&self) -> u64 {
        self.fps
    }

    fn render(&self, memory: &MemorySnapshot, ticks: u64) -> String {
        let mut out = String::with_capacity(192);
        let _ = writeln!(out, "{}", self.header);
        let _ = writeln!(out);
        let _ = writeln!(out, "Memory(MB):");
        let _ = writeln!(out, "Init: {}", group_digits(memory.init / BYTES_PER_MB));
        let _ = writeln!(out, "Used: {}", group_digits(memory.used / BYTES_PER_MB));
        let _ = writeln!(
            out,
            "Committed: {}",
            group_digits(memory.committed / BYTES_PER_MB)
        );
        let _ = writeln!(out, "Max: {}", group_digits(memory.max / BYTES_PER_MB));
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Average frame interval(ms): {:.3}",
            self.stats.mean_interval_ms()
        );
        let _ = writeln!(out, "Frame: {}", group_digits(ticks));
        let _ = write!(out, "FPS: {}", self.fps);
        out
    }
}

/// `1234567` -> `"1,234,567"`.
fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// Thread lifecycle
// ============================================================================

/// Wakeable stop flag for the sampler thread.
#[derive(Clone)]
struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    /// Sleep for `duration` or until triggered. Returns `true` once triggered.
    fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now() + duration;
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            stopped = cvar
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

/// Handle to the running sampler thread. Dropping it signals the thread to exit.
pub struct DiagnosticsSampler {
    stop: StopSignal,
    thread: Option<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for DiagnosticsSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsSampler")
            .field("running", &self.is_running())
            .finish()
    }
}

impl DiagnosticsSampler {
    /// Spawn a thread calling [`Sampler::sample`] every `period`.
    #[must_use]
    pub fn spawn(mut sampler: Sampler, period: Duration) -> Self {
        let stop = StopSignal::new();
        let signal = stop.clone();
        let spawned = thread::Builder::new()
            .name("stagecraft-diagnostics".into())
            .spawn(move || {
                crate::debug_trace!("diagnostics sampler started");
                while !signal.wait_timeout(period) {
                    sampler.sample();
                }
                crate::debug_trace!("diagnostics sampler exiting");
            });
        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "failed to spawn diagnostics sampler");
                None
            }
        };
        Self { stop, thread }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.stop.trigger();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DiagnosticsSampler {
    fn drop(&mut self) {
        self.stop.trigger();
    }
}
