#![forbid(unsafe_code)]

//! Snapdeck Runtime
//!
//! The components of a full-viewport, section-snapping page and the wiring
//! that lets them share one scroll container without fighting over it.
//!
//! # Key Components
//!
//! - [`SignalBus`] - Synchronous same-thread pub/sub for page signals
//! - [`ScrollArbiter`] - Single owner of the lock state; gates surface writes
//! - [`ViewportNormalizer`] - Publishes the visible height as `--app-height`
//! - [`SnapController`] - Parks, reveals, and snap-enables the surface
//! - [`NavigationEnhancer`] - One section per wheel gesture or key press
//! - [`LockdownOverlay`] - Freezes the page and restores it exactly
//! - [`Page`] - Composes all of the above for a host
//!
//! # How it fits in the system
//! `snapdeck-core` supplies the vocabulary (events, signals, geometry,
//! animation). This crate owns behavior. Hosts (`snapdeck-web`, tests)
//! implement [`ScrollSurface`] and [`Host`], feed events into
//! [`Page::dispatch`], and call [`Page::frame`] once per animation frame.

pub mod arbiter;
pub mod bus;
pub mod config;
pub mod debug_trace;
pub mod host;
pub mod lockdown;
pub mod navigation;
pub mod page;
pub mod snap;
pub mod surface;
pub mod viewport;

pub use arbiter::{Authority, ScrollArbiter, ScrollDenied};
pub use bus::{SignalBus, SubId, Subscription, WeakSignalBus};
pub use config::{
    APP_HEIGHT_PROPERTY, ConfigError, NavigationConfig, PageConfig, SnapConfig, ViewportConfig,
};
pub use host::{Host, HostHandle, MemoryHost};
pub use lockdown::{LOCKED_STYLES, LockdownDecor, LockdownOverlay, NoDecor, StyleSnapshot};
pub use navigation::{NavMode, NavigationEnhancer};
pub use page::{FrameReport, Page};
pub use snap::{SnapController, SnapStage};
pub use surface::{MemorySurface, SURFACE_MARKER, ScrollSurface, StyleProperty, SurfaceHandle};
pub use viewport::ViewportNormalizer;

pub use snapdeck_core::event::{
    Disposition, EventTarget, KeyCode, KeyEvent, Modifiers, PageEvent, VisualViewportChange,
    WheelEvent,
};
pub use snapdeck_core::signal::{LockState, Signal, UnknownSignal};
