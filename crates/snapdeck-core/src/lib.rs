#![forbid(unsafe_code)]

//! Core: page input events, broadcast signals, scroll geometry, and animation.

pub mod animation;
pub mod event;
pub mod frame_coalescer;
pub mod geometry;
pub mod logging;
pub mod signal;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
