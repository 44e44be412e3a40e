#![forbid(unsafe_code)]

//! Wheel and keyboard navigation, one section per gesture.
//!
//! # State machine
//!
//! ```text
//!            lockdown:enable (cancel animation)
//!  Active ─────────────────────────────────────▶ Suspended
//!    ▲                                              │
//!    └──────────────────────────────────────────────┘
//!            lockdown:disable (no catch-up scroll)
//! ```
//!
//! While `Active`, a wheel event on the surface (past the noise threshold)
//! or a navigation key computes the neighbouring section and starts an eased
//! [`ScrollAnimation`] towards it. Frames advance the animation through the
//! [`ScrollArbiter`].
//!
//! While `Suspended`, the same inputs are swallowed without scrolling.
//! The mode flips inside the bus callback, so an animation is already
//! cancelled when `publish(LockdownEnable)` returns.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use snapdeck_core::animation::{AnimationState, ScrollAnimation};
use snapdeck_core::event::{Disposition, EventTarget, KeyCode, KeyEvent, WheelEvent};
use snapdeck_core::geometry::{NavigationIntent, ScrollMetrics};
use snapdeck_core::signal::Signal;

use crate::arbiter::{Authority, ScrollArbiter};
use crate::bus::{SignalBus, Subscription};
use crate::config::NavigationConfig;

/// Whether navigation input is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NavMode {
    /// Input scrolls the surface.
    #[default]
    Active,
    /// Input is swallowed until the lockdown ends.
    Suspended,
}

#[derive(Debug, Default)]
struct NavState {
    mode: NavMode,
    animation: ScrollAnimation,
}

impl NavState {
    fn on_signal(&mut self, signal: Signal) {
        match signal {
            Signal::LockdownEnable => {
                self.mode = NavMode::Suspended;
                if self.animation.cancel() {
                    tracing::debug!("navigation animation cancelled by lockdown");
                }
            }
            Signal::LockdownDisable => self.mode = NavMode::Active,
            Signal::MediaPauseRequest => {}
        }
    }
}

/// Key-to-section mapping.
fn key_intent(key: &KeyEvent, metrics: &ScrollMetrics) -> Option<NavigationIntent> {
    let intent = match key.code {
        KeyCode::ArrowDown | KeyCode::PageDown => metrics.step(1),
        KeyCode::ArrowUp | KeyCode::PageUp => metrics.step(-1),
        KeyCode::Space if key.shift() => metrics.step(-1),
        KeyCode::Space => metrics.step(1),
        KeyCode::Home => metrics.jump_to(0.0),
        KeyCode::End => metrics.jump_to(metrics.max_offset()),
        _ => return None,
    };
    Some(intent)
}

/// Section-at-a-time scroll enhancer.
pub struct NavigationEnhancer {
    arbiter: ScrollArbiter,
    config: NavigationConfig,
    state: Rc<RefCell<NavState>>,
    _lock_signals: Subscription,
}

impl std::fmt::Debug for NavigationEnhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("NavigationEnhancer")
            .field("mode", &state.mode)
            .field("animation", &state.animation.state())
            .finish()
    }
}

impl NavigationEnhancer {
    /// Create an enhancer listening for lock signals on `bus`.
    pub fn new(arbiter: ScrollArbiter, bus: &SignalBus, config: NavigationConfig) -> Self {
        let state = Rc::new(RefCell::new(NavState::default()));
        let listener = Rc::clone(&state);
        let subscription = bus.subscribe(move |signal| {
            if signal.is_lockdown() {
                listener.borrow_mut().on_signal(signal);
            }
        });
        Self {
            arbiter,
            config,
            state,
            _lock_signals: subscription,
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> NavMode {
        self.state.borrow().mode
    }

    /// Lifecycle of the current (or last) animation.
    #[must_use]
    pub fn animation_state(&self) -> AnimationState {
        self.state.borrow().animation.state()
    }

    /// Whether an animation is in flight.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state.borrow().animation.is_running()
    }

    /// Target of the in-flight animation.
    #[must_use]
    pub fn animation_target(&self) -> Option<f64> {
        let state = self.state.borrow();
        state
            .animation
            .is_running()
            .then(|| state.animation.target())
    }

    /// Handle a wheel event. Legacy `DOMMouseScroll` events are left alone.
    pub fn wheel(&self, event: &WheelEvent, now: Duration) -> Disposition {
        if event.legacy || event.target != EventTarget::Surface {
            return Disposition::Pass;
        }
        let Some(metrics) = self.arbiter.metrics() else {
            return Disposition::Pass;
        };
        if self.mode() == NavMode::Suspended {
            return Disposition::Prevent;
        }
        if event.delta_y.is_nan() || event.delta_y.abs() <= self.config.wheel_threshold {
            return Disposition::Pass;
        }
        let intent = metrics.step(event.direction());
        self.start(intent, now, self.config.wheel_duration);
        Disposition::Prevent
    }

    /// Handle a keydown.
    pub fn key(&self, event: &KeyEvent, now: Duration) -> Disposition {
        let Some(metrics) = self.arbiter.metrics() else {
            return Disposition::Pass;
        };
        let Some(intent) = key_intent(event, &metrics) else {
            return Disposition::Pass;
        };
        if self.mode() == NavMode::Active {
            self.start(intent, now, self.config.key_duration);
        }
        Disposition::Prevent
    }

    fn start(&self, intent: NavigationIntent, now: Duration, duration: Duration) {
        if !intent.exceeds(self.config.min_travel) {
            tracing::trace!(from = intent.from, target = intent.target, "intent below min travel");
            return;
        }
        if self.arbiter.is_locked() {
            return;
        }
        self.state
            .borrow_mut()
            .animation
            .start(intent.from, intent.target, now, duration);
        crate::debug_trace!("navigate {} -> {}", intent.from, intent.target);
        tracing::debug!(from = intent.from, target = intent.target, "navigation started");
    }

    /// Advance the in-flight animation and write the offset.
    pub fn frame(&self, now: Duration) -> Option<f64> {
        let offset = self.state.borrow_mut().animation.step(now)?;
        let written = self
            .arbiter
            .write_or_log(Authority::Page, |s| s.set_scroll_top(offset));
        if written.is_none() {
            self.state.borrow_mut().animation.cancel();
            return None;
        }
        Some(offset)
    }

    /// Abort the in-flight animation, leaving the offset where it is.
    pub fn cancel(&self) -> bool {
        self.state.borrow_mut().animation.cancel()
    }
}
