#![forbid(unsafe_code)]

//! snapdeck public facade crate.
//!
//! This crate provides the stable surface area for embedding a scroll-snap
//! page. It re-exports the common types from the internal crates and offers
//! a small prelude.
//!
//! ```ignore
//! use snapdeck::prelude::*;
//!
//! let mut page = Page::new(PageConfig::default(), host, surface)?;
//! page.mount();
//! if page.dispatch(&event, now).is_prevented() { /* preventDefault() */ }
//! page.frame(now);
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use snapdeck_core::animation::{AnimationState, ScrollAnimation};
pub use snapdeck_core::event::{
    Disposition, EventTarget, KeyCode, KeyEvent, Modifiers, PageEvent, VisualViewportChange,
    WheelEvent,
};
pub use snapdeck_core::geometry::{NavigationIntent, ScrollMetrics, ViewportSize};
pub use snapdeck_core::signal::{LockState, Signal, UnknownSignal};

// --- Runtime re-exports ----------------------------------------------------

pub use snapdeck_runtime::{
    Authority, ConfigError, FrameReport, Host, HostHandle, LockdownDecor, LockdownOverlay,
    MemoryHost, MemorySurface, NavMode, NavigationConfig, NavigationEnhancer, NoDecor, Page,
    PageConfig, ScrollArbiter, ScrollDenied, ScrollSurface, SignalBus, SnapConfig, SnapController,
    SnapStage, StyleProperty, Subscription, SurfaceHandle, ViewportConfig, ViewportNormalizer,
    WeakSignalBus,
};

// --- Extras re-exports -----------------------------------------------------

#[cfg(feature = "extras")]
pub use snapdeck_extras::banner::{BannerConfig, Carousel, Parallax, ParallaxConfig};
#[cfg(feature = "extras")]
pub use snapdeck_extras::media::{
    AudioSink, LockdownSoundtrack, MediaConfig, MediaError, MusicPlayer, SoundtrackState, TrackInfo,
};
#[cfg(feature = "extras")]
pub use snapdeck_extras::popup_trail::{PopupTrail, PopupTrailConfig};

#[cfg(feature = "tracing-json")]
pub use snapdeck_core::logging::install_json_subscriber;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for snapdeck embedders.
#[derive(Debug)]
pub enum Error {
    /// Page configuration was rejected.
    Config(ConfigError),
    /// A signal name outside the page vocabulary.
    Signal(UnknownSignal),
    /// Playlist or playback failure.
    #[cfg(feature = "extras")]
    Media(MediaError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Signal(err) => write!(f, "{err}"),
            #[cfg(feature = "extras")]
            Self::Media(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Signal(err) => Some(err),
            #[cfg(feature = "extras")]
            Self::Media(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<UnknownSignal> for Error {
    fn from(err: UnknownSignal) -> Self {
        Self::Signal(err)
    }
}

#[cfg(feature = "extras")]
impl From<MediaError> for Error {
    fn from(err: MediaError) -> Self {
        Self::Media(err)
    }
}

/// Standard result type for snapdeck APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Disposition, Error, Host, HostHandle, KeyCode, KeyEvent, LockState, Page, PageConfig,
        PageEvent, Result, ScrollSurface, Signal, SignalBus, SurfaceHandle, WheelEvent,
    };

    pub use crate::{core, runtime};
}

pub use snapdeck_core as core;
#[cfg(feature = "extras")]
pub use snapdeck_extras as extras;
pub use snapdeck_runtime as runtime;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn errors_convert_and_display() {
        let err: Error = "lockdown:toggle".parse::<Signal>().unwrap_err().into();
        assert_eq!(err.to_string(), r#"unknown signal: "lockdown:toggle""#);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_config_surfaces_as_error() {
        let config = PageConfig::default()
            .with_navigation(NavigationConfig::default().with_min_travel(-1.0));
        let host: HostHandle = std::rc::Rc::new(std::cell::RefCell::new(MemoryHost::new(
            800.0, 600.0,
        )));
        let result: Result<Page> =
            Page::new(config, host, SurfaceHandle::empty()).map_err(Error::from);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
