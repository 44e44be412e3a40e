#![forbid(unsafe_code)]

//! `snapdeck-web` runs a snapdeck page inside a browser.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding page (JS) pushes input events and
//!   animation-frame timestamps.
//! - **Deterministic time**: the host advances a monotonic clock explicitly,
//!   so the same input log replays to the same scroll offsets.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! [`step_page::StepPage`] is the portable runner used by tests and replay
//! tools. On `wasm32` the crate also exports a `SnapdeckPage` class that binds
//! the runner to the live DOM.

pub mod input;
pub mod step_page;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::SnapdeckPage;

use core::time::Duration;

use serde::Deserialize;
use snapdeck_runtime::config::{ConfigError, PageConfig};

/// Web host error type.
#[derive(Debug)]
pub enum WebPageError {
    /// Options JSON did not parse.
    Options(serde_json::Error),
    /// Options parsed but the configuration is invalid.
    Config(ConfigError),
    /// An input record did not parse.
    Input(serde_json::Error),
    /// A required DOM node is missing.
    MissingElement(&'static str),
}

impl core::fmt::Display for WebPageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Options(e) => write!(f, "invalid options: {e}"),
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Input(e) => write!(f, "invalid input record: {e}"),
            Self::MissingElement(what) => write!(f, "missing element: {what}"),
        }
    }
}

impl std::error::Error for WebPageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Options(e) | Self::Input(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::MissingElement(_) => None,
        }
    }
}

impl From<ConfigError> for WebPageError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Never moves backwards.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Options accepted by the web entry points.
///
/// Page settings sit at the top level next to the web-only keys:
///
/// ```json
/// {"navigation":{"minTravel":80},"popups":true,"seed":7}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebOptions {
    /// Page configuration.
    #[serde(flatten)]
    pub page: PageConfig,
    /// Show the popup trail while locked.
    pub popups: bool,
    /// PRNG seed for decor; the host clock when absent.
    pub seed: Option<u64>,
}

impl Default for WebOptions {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            popups: true,
            seed: None,
        }
    }
}

impl WebOptions {
    /// Parse and validate options. Blank input means defaults.
    pub fn parse(json: &str) -> Result<Self, WebPageError> {
        let options = if json.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str::<Self>(json).map_err(WebPageError::Options)?
        };
        options.page.validate()?;
        Ok(options)
    }
}
