#![forbid(unsafe_code)]

//! Page-wide broadcast signals and the lock state they drive.
//!
//! Signals carry no payload. Their wire names match the custom DOM events
//! the page exchanges with scripts outside the Rust layer.

use std::fmt;
use std::str::FromStr;

/// A payload-less, page-wide notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Enter the lockdown state.
    LockdownEnable,
    /// Leave the lockdown state.
    LockdownDisable,
    /// Ask whichever media component is playing to pause.
    MediaPauseRequest,
}

impl Signal {
    /// All signals, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::LockdownEnable,
        Self::LockdownDisable,
        Self::MediaPauseRequest,
    ];

    /// Wire name of the signal.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LockdownEnable => "lockdown:enable",
            Self::LockdownDisable => "lockdown:disable",
            Self::MediaPauseRequest => "media:pause-request",
        }
    }

    /// Whether this signal toggles the lock state.
    #[must_use]
    pub const fn is_lockdown(&self) -> bool {
        matches!(self, Self::LockdownEnable | Self::LockdownDisable)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A signal name that is not part of the page vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSignal(pub String);

impl fmt::Display for UnknownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown signal: {:?}", self.0)
    }
}

impl std::error::Error for UnknownSignal {}

impl FromStr for Signal {
    type Err = UnknownSignal;

    /// Accepts the wire names plus the legacy DOM event names
    /// (`site-lockdown:enable`, `site-lockdown:disable`, `pause-audio`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(signal) = Self::ALL.into_iter().find(|signal| signal.name() == s) {
            return Ok(signal);
        }
        match s {
            "site-lockdown:enable" => Ok(Self::LockdownEnable),
            "site-lockdown:disable" => Ok(Self::LockdownDisable),
            "pause-audio" => Ok(Self::MediaPauseRequest),
            other => Err(UnknownSignal(other.to_string())),
        }
    }
}

/// Page-wide lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockState {
    /// Normal navigation.
    #[default]
    Unlocked,
    /// The lockdown overlay owns the scroll surface.
    Locked,
}

impl LockState {
    /// Whether the page is locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked)
    }

    /// Apply a lockdown signal.
    ///
    /// Returns the new state if the signal causes a transition, `None` if it
    /// is a no-op (repeated enable, repeated disable, or a non-lock signal).
    #[must_use]
    pub const fn transition(&self, signal: Signal) -> Option<Self> {
        match (self, signal) {
            (Self::Unlocked, Signal::LockdownEnable) => Some(Self::Locked),
            (Self::Locked, Signal::LockdownDisable) => Some(Self::Unlocked),
            _ => None,
        }
    }
}
