#![forbid(unsafe_code)]

//! Exclusive write access to the snap surface.
//!
//! The arbiter owns the page's [`LockState`]. Every surface mutation names
//! an [`Authority`] and is checked against the current state: the page's own
//! components write only while unlocked, the lockdown overlay only while
//! locked. Reads are always allowed.
//!
//! Only the lockdown overlay drives the state machine; the transition entry
//! points are crate-private.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use snapdeck_core::geometry::ScrollMetrics;
use snapdeck_core::signal::{LockState, Signal};

use crate::surface::{ScrollSurface, SurfaceHandle};

/// Who is asking to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authority {
    /// Snap controller and navigation enhancer.
    Page,
    /// The lockdown overlay.
    Lockdown,
}

/// Why a write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDenied {
    /// The page asked while the lockdown holds the surface.
    Locked,
    /// The lockdown asked while the page holds the surface.
    NotLocked,
    /// No surface is mounted.
    NoSurface,
}

impl fmt::Display for ScrollDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "surface is locked"),
            Self::NotLocked => write!(f, "surface is not locked"),
            Self::NoSurface => write!(f, "no snap surface mounted"),
        }
    }
}

impl std::error::Error for ScrollDenied {}

/// Shared lock state plus gated surface access.
#[derive(Clone, Default)]
pub struct ScrollArbiter {
    surface: SurfaceHandle,
    state: Rc<Cell<LockState>>,
}

impl fmt::Debug for ScrollArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollArbiter")
            .field("state", &self.state.get())
            .field("surface", &self.surface)
            .finish()
    }
}

impl ScrollArbiter {
    /// Arbitrate writes to `surface`, starting unlocked.
    #[must_use]
    pub fn new(surface: SurfaceHandle) -> Self {
        Self {
            surface,
            state: Rc::default(),
        }
    }

    /// Current lock state.
    #[must_use]
    pub fn lock_state(&self) -> LockState {
        self.state.get()
    }

    /// Shorthand for `lock_state().is_locked()`.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state.get().is_locked()
    }

    /// The arbitrated surface slot.
    #[must_use]
    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    /// Current geometry, if a surface is mounted.
    #[must_use]
    pub fn metrics(&self) -> Option<ScrollMetrics> {
        self.surface.metrics()
    }

    /// Read from the surface, if mounted.
    pub fn read<R>(&self, f: impl FnOnce(&dyn ScrollSurface) -> R) -> Option<R> {
        self.surface.read(f)
    }

    /// Whether `authority` may write right now.
    pub fn check(&self, authority: Authority) -> Result<(), ScrollDenied> {
        match (authority, self.state.get()) {
            (Authority::Page, LockState::Locked) => Err(ScrollDenied::Locked),
            (Authority::Lockdown, LockState::Unlocked) => Err(ScrollDenied::NotLocked),
            _ if !self.surface.is_mounted() => Err(ScrollDenied::NoSurface),
            _ => Ok(()),
        }
    }

    /// Mutate the surface on behalf of `authority`.
    pub fn write<R>(
        &self,
        authority: Authority,
        f: impl FnOnce(&mut dyn ScrollSurface) -> R,
    ) -> Result<R, ScrollDenied> {
        self.check(authority)?;
        self.surface.write(f).ok_or(ScrollDenied::NoSurface)
    }

    /// Like [`write`](Self::write), but a denial is logged and dropped.
    pub fn write_or_log<R>(
        &self,
        authority: Authority,
        f: impl FnOnce(&mut dyn ScrollSurface) -> R,
    ) -> Option<R> {
        match self.write(authority, f) {
            Ok(r) => Some(r),
            Err(denied) => {
                tracing::debug!(?authority, %denied, "surface write denied");
                None
            }
        }
    }

    /// Apply a lock signal. Returns the new state when it changed.
    pub(crate) fn transition(&self, signal: Signal) -> Option<LockState> {
        let next = self.state.get().transition(signal)?;
        self.state.set(next);
        crate::debug_trace!("lock state -> {:?}", next);
        tracing::info!(state = ?next, signal = signal.name(), "lock state changed");
        Some(next)
    }
}
