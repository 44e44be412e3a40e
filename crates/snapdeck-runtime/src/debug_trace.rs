#![forbid(unsafe_code)]

//! Opt-in stderr tracing controlled by an environment variable.
//!
//! Set `SNAPDECK_DEBUG_TRACE=1` to get timestamped lines for bus traffic and
//! lock transitions without configuring a `tracing` subscriber. On
//! `wasm32-unknown-unknown` the variable never exists, so the macro is a
//! single bool load there.
//!
//! ```ignore
//! use snapdeck_runtime::debug_trace;
//! debug_trace!("publish {} -> {} listeners", signal, count);
//! ```

use std::sync::LazyLock;
use std::time::Instant;

static DEBUG_TRACE_ENABLED: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("SNAPDECK_DEBUG_TRACE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Check if debug tracing is enabled.
#[inline]
pub fn is_enabled() -> bool {
    *DEBUG_TRACE_ENABLED
}

/// Milliseconds since the first traced line.
///
/// Only called behind [`is_enabled`], so the clock is never touched on
/// targets without one.
#[inline]
pub fn elapsed_ms() -> u64 {
    START_TIME.elapsed().as_millis() as u64
}

/// Print a timestamped line to stderr when `SNAPDECK_DEBUG_TRACE=1`.
#[macro_export]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        if $crate::debug_trace::is_enabled() {
            eprintln!(
                "[SNAPDECK {:>8}ms] {}",
                $crate::debug_trace::elapsed_ms(),
                format_args!($($arg)*)
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_enabled_is_stable() {
        assert_eq!(is_enabled(), is_enabled());
    }

    #[test]
    fn macro_expands_in_statement_position() {
        let n = 3;
        debug_trace!("listeners={}", n);
    }
}
