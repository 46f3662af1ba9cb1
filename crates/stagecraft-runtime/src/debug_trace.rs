#![forbid(unsafe_code)]

//! Frame-loop tracing for bug hunts.
//!
//! `STAGECRAFT_DEBUG_TRACE` accepts the same flag spellings as the other
//! `STAGECRAFT_*` switches (`1`, `true`, `on`, ...). The value is read once;
//! when off, a [`debug_trace!`](crate::debug_trace) site is a single load of
//! a cached bool. Lines go to stderr as
//! `[stagecraft +<ms>ms <thread>] <message>` so output from the frame loop and
//! the diagnostics thread can be told apart.

use std::sync::LazyLock;
use std::thread;
use std::time::Instant;

use crate::config::parse_flag;

pub const DEBUG_TRACE_ENV: &str = "STAGECRAFT_DEBUG_TRACE";

struct TraceState {
    enabled: bool,
    epoch: Instant,
}

static STATE: LazyLock<TraceState> = LazyLock::new(|| TraceState {
    enabled: std::env::var(DEBUG_TRACE_ENV)
        .ok()
        .and_then(|v| parse_flag(v.trim()))
        .unwrap_or(false),
    epoch: Instant::now(),
});

#[inline]
pub fn is_enabled() -> bool {
    STATE.enabled
}

/// Milliseconds since tracing state was first touched.
pub fn elapsed_ms() -> u64 {
    u64::try_from(STATE.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Name of the calling thread, or `?` for unnamed ones.
pub fn thread_label() -> String {
    thread::current().name().unwrap_or("?").to_owned()
}

/// Write one frame-loop trace line to stderr when `STAGECRAFT_DEBUG_TRACE` is on.
#[macro_export]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        if $crate::debug_trace::is_enabled() {
            eprintln!(
                "[stagecraft +{}ms {}] {}",
                $crate::debug_trace::elapsed_ms(),
                $crate::debug_trace::thread_label(),
                format_args!($($arg)*)
            );
        }
    };
}
