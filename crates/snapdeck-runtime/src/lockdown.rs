#![forbid(unsafe_code)]

//! The lockdown overlay: a full-page easter egg that freezes scrolling.
//!
//! # State machine
//!
//! ```text
//!                  lockdown:enable
//!   Unlocked ──────────────────────────▶ Locked
//!       ▲      snapshot + override styles   │
//!       │      show decor, pause media      │
//!       │                                   │
//!       └───────────────────────────────────┘
//!                  lockdown:disable
//!              restore snapshot, hide decor
//! ```
//!
//! Entering `Locked` snapshots the surface's inline `overflow`,
//! `overscroll-behavior`, and `touch-action` (plus the body's `overflow`)
//! before overriding them. Leaving restores exactly those values; a value
//! that was absent before is removed rather than written back empty.
//!
//! Repeated signals are no-ops: a second `enable` never re-snapshots the
//! already overridden styles, a stray `disable` never restores a stale
//! snapshot.
//!
//! While locked, [`LockdownOverlay::capture`] swallows every scroll gesture
//! and scrolling key before any other handler sees it.

use std::cell::RefCell;
use std::rc::Rc;

use snapdeck_core::event::{Disposition, PageEvent};
use snapdeck_core::geometry::ViewportSize;
use snapdeck_core::signal::Signal;

use crate::arbiter::{Authority, ScrollArbiter};
use crate::bus::{SignalBus, Subscription};
use crate::host::HostHandle;
use crate::surface::{ScrollSurface, StyleProperty};

/// Inline styles forced onto the surface while locked.
pub const LOCKED_STYLES: [(StyleProperty, &str); 3] = [
    (StyleProperty::Overflow, "hidden"),
    (StyleProperty::OverscrollBehavior, "none"),
    (StyleProperty::TouchAction, "none"),
];

/// Decorative content shown while locked.
pub trait LockdownDecor {
    /// Lay out and show the decor for a viewport.
    fn show(&mut self, viewport: ViewportSize);

    /// Remove the decor.
    fn hide(&mut self);

    /// The viewport changed while shown.
    fn resize(&mut self, viewport: ViewportSize) {
        let _ = viewport;
    }
}

/// Decor that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecor;

impl LockdownDecor for NoDecor {
    fn show(&mut self, _viewport: ViewportSize) {}

    fn hide(&mut self) {}
}

/// A decor the host keeps its own reference to.
impl<D: LockdownDecor> LockdownDecor for Rc<RefCell<D>> {
    fn show(&mut self, viewport: ViewportSize) {
        self.borrow_mut().show(viewport);
    }

    fn hide(&mut self) {
        self.borrow_mut().hide();
    }

    fn resize(&mut self, viewport: ViewportSize) {
        self.borrow_mut().resize(viewport);
    }
}

/// Two decors driven together; shown first to last, hidden last to first.
impl<A: LockdownDecor, B: LockdownDecor> LockdownDecor for (A, B) {
    fn show(&mut self, viewport: ViewportSize) {
        self.0.show(viewport);
        self.1.show(viewport);
    }

    fn hide(&mut self) {
        self.1.hide();
        self.0.hide();
    }

    fn resize(&mut self, viewport: ViewportSize) {
        self.0.resize(viewport);
        self.1.resize(viewport);
    }
}

/// Surface styles as they were before the lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSnapshot {
    /// Prior `overflow`.
    pub overflow: Option<String>,
    /// Prior `overscroll-behavior`.
    pub overscroll_behavior: Option<String>,
    /// Prior `touch-action`.
    pub touch_action: Option<String>,
}

impl StyleSnapshot {
    /// Read the three restorable properties.
    pub fn capture(surface: &dyn ScrollSurface) -> Self {
        Self {
            overflow: surface.style(StyleProperty::Overflow),
            overscroll_behavior: surface.style(StyleProperty::OverscrollBehavior),
            touch_action: surface.style(StyleProperty::TouchAction),
        }
    }

    /// Write the snapshot back, removing properties that had no value.
    pub fn restore(&self, surface: &mut dyn ScrollSurface) {
        let entries = [
            (StyleProperty::Overflow, &self.overflow),
            (StyleProperty::OverscrollBehavior, &self.overscroll_behavior),
            (StyleProperty::TouchAction, &self.touch_action),
        ];
        for (property, prior) in entries {
            match prior.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => surface.set_style(property, value),
                _ => surface.remove_style(property),
            }
        }
    }
}

struct Held {
    decor: Box<dyn LockdownDecor>,
    surface: Option<StyleSnapshot>,
    body_overflow: Option<Option<String>>,
}

struct Shared {
    arbiter: ScrollArbiter,
    host: HostHandle,
    held: RefCell<Held>,
}

impl Shared {
    /// Returns `true` when the page actually locked.
    fn engage(&self) -> bool {
        if self.arbiter.transition(Signal::LockdownEnable).is_none() {
            tracing::debug!("lockdown already engaged");
            return false;
        }
        let viewport = self.host.borrow().inner_size();
        let mut held = self.held.borrow_mut();
        held.decor.show(viewport);

        {
            let mut host = self.host.borrow_mut();
            held.body_overflow = Some(host.body_overflow());
            host.set_body_overflow(Some("hidden"));
        }

        held.surface = self.arbiter.write_or_log(Authority::Lockdown, |s| {
            let snapshot = StyleSnapshot::capture(s);
            for (property, value) in LOCKED_STYLES {
                s.set_style(property, value);
            }
            snapshot
        });
        tracing::info!(surface = held.surface.is_some(), "lockdown engaged");
        true
    }

    fn release(&self) -> bool {
        if !self.arbiter.is_locked() {
            tracing::debug!("lockdown not engaged");
            return false;
        }
        {
            let mut held = self.held.borrow_mut();
            held.decor.hide();
            if let Some(prior) = held.body_overflow.take() {
                self.host.borrow_mut().set_body_overflow(prior.as_deref());
            }
            if let Some(snapshot) = held.surface.take() {
                self.arbiter
                    .write_or_log(Authority::Lockdown, |s| snapshot.restore(s));
            }
        }
        self.arbiter.transition(Signal::LockdownDisable);
        tracing::info!("lockdown released");
        true
    }
}

/// Owns the lock transition and its side effects.
pub struct LockdownOverlay {
    shared: Rc<Shared>,
    _signals: Subscription,
}

impl std::fmt::Debug for LockdownOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockdownOverlay")
            .field("state", &self.shared.arbiter.lock_state())
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl LockdownOverlay {
    /// Create an overlay driven by lock signals on `bus`.
    ///
    /// On engage it publishes [`Signal::MediaPauseRequest`] on the same bus.
    pub fn new(
        arbiter: ScrollArbiter,
        host: HostHandle,
        bus: &SignalBus,
        decor: Box<dyn LockdownDecor>,
    ) -> Self {
        let shared = Rc::new(Shared {
            arbiter,
            host,
            held: RefCell::new(Held {
                decor,
                surface: None,
                body_overflow: None,
            }),
        });
        let listener = Rc::clone(&shared);
        let weak_bus = bus.downgrade();
        let subscription = bus.subscribe(move |signal| match signal {
            Signal::LockdownEnable => {
                if listener.engage() {
                    if let Some(bus) = weak_bus.upgrade() {
                        bus.publish(Signal::MediaPauseRequest);
                    }
                }
            }
            Signal::LockdownDisable => {
                listener.release();
            }
            Signal::MediaPauseRequest => {}
        });
        Self {
            shared,
            _signals: subscription,
        }
    }

    /// Whether the page is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.shared.arbiter.is_locked()
    }

    /// The surface snapshot taken on engage, while locked.
    #[must_use]
    pub fn snapshot(&self) -> Option<StyleSnapshot> {
        self.shared.held.borrow().surface.clone()
    }

    /// Capture-phase guard. Runs before every other input handler.
    #[must_use]
    pub fn capture(&self, event: &PageEvent) -> Disposition {
        if !self.is_locked() {
            return Disposition::Pass;
        }
        match event {
            PageEvent::Key(key) if key.code.scrolls_page() => Disposition::Prevent,
            other if other.is_scroll_gesture() => Disposition::Prevent,
            _ => Disposition::Pass,
        }
    }

    /// Re-lay-out the decor after a viewport change, while locked.
    pub fn resize(&self, viewport: ViewportSize) {
        if self.is_locked() {
            self.shared.held.borrow_mut().decor.resize(viewport);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use snapdeck_core::event::{KeyCode, KeyEvent, WheelEvent};

    use super::*;
    use crate::host::{Host, MemoryHost};
    use crate::surface::{MemorySurface, SurfaceHandle};

    #[derive(Default)]
    struct CountingDecor {
        shows: u32,
        hides: u32,
        resizes: Vec<ViewportSize>,
    }

    impl LockdownDecor for CountingDecor {
        fn show(&mut self, _viewport: ViewportSize) {
            self.shows += 1;
        }
        fn hide(&mut self) {
            self.hides += 1;
        }
        fn resize(&mut self, viewport: ViewportSize) {
            self.resizes.push(viewport);
        }
    }

    struct Fixture {
        surface: Rc<RefCell<MemorySurface>>,
        host: Rc<RefCell<MemoryHost>>,
        decor: Rc<RefCell<CountingDecor>>,
        bus: SignalBus,
        overlay: LockdownOverlay,
    }

    fn fixture(surface: MemorySurface, host: MemoryHost) -> Fixture {
        let surface = Rc::new(RefCell::new(surface));
        let host = Rc::new(RefCell::new(host));
        let decor = Rc::new(RefCell::new(CountingDecor::default()));
        let bus = SignalBus::new();
        let host_handle: HostHandle = host.clone();
        let overlay = LockdownOverlay::new(
            ScrollArbiter::new(SurfaceHandle::new(Rc::clone(&surface))),
            host_handle,
            &bus,
            Box::new(Rc::clone(&decor)),
        );
        Fixture {
            surface,
            host,
            decor,
            bus,
            overlay,
        }
    }

    fn styled_surface() -> MemorySurface {
        MemorySurface::with_sections(800.0, 5)
            .with_style(StyleProperty::Overflow, "auto")
            .with_style(StyleProperty::TouchAction, "pan-y")
    }

    #[test]
    fn enable_overrides_and_disable_restores_exactly() {
        let f = fixture(styled_surface(), MemoryHost::new(1280.0, 800.0).with_body_overflow("auto"));
        f.bus.publish(Signal::LockdownEnable);
        {
            let s = f.surface.borrow();
            assert_eq!(s.style(StyleProperty::Overflow).as_deref(), Some("hidden"));
            assert_eq!(s.style(StyleProperty::OverscrollBehavior).as_deref(), Some("none"));
            assert_eq!(s.style(StyleProperty::TouchAction).as_deref(), Some("none"));
        }
        assert_eq!(f.host.borrow().body_overflow().as_deref(), Some("hidden"));

        f.bus.publish(Signal::LockdownDisable);
        let s = f.surface.borrow();
        assert_eq!(s.style(StyleProperty::Overflow).as_deref(), Some("auto"));
        assert_eq!(s.style(StyleProperty::OverscrollBehavior), None);
        assert_eq!(s.style(StyleProperty::TouchAction).as_deref(), Some("pan-y"));
        assert_eq!(f.host.borrow().body_overflow().as_deref(), Some("auto"));
        assert_eq!(f.overlay.snapshot(), None);
    }

    #[test]
    fn double_enable_keeps_first_snapshot() {
        let f = fixture(styled_surface(), MemoryHost::new(1280.0, 800.0));
        f.bus.publish(Signal::LockdownEnable);
        f.bus.publish(Signal::LockdownEnable);
        assert_eq!(f.decor.borrow().shows, 1);
        assert_eq!(
            f.overlay.snapshot().and_then(|s| s.overflow),
            Some("auto".to_string())
        );
        f.bus.publish(Signal::LockdownDisable);
        assert_eq!(
            f.surface.borrow().style(StyleProperty::Overflow).as_deref(),
            Some("auto")
        );
    }

    #[test]
    fn stray_disable_is_a_noop() {
        let f = fixture(styled_surface(), MemoryHost::new(1280.0, 800.0));
        f.bus.publish(Signal::LockdownDisable);
        assert_eq!(f.decor.borrow().hides, 0);
        assert_eq!(
            f.surface.borrow().style(StyleProperty::TouchAction).as_deref(),
            Some("pan-y")
        );
    }

    #[test]
    fn engage_requests_media_pause() {
        let f = fixture(styled_surface(), MemoryHost::new(1280.0, 800.0));
        let pauses = Rc::new(Cell::new(0));
        let p = Rc::clone(&pauses);
        let _media = f.bus.on(Signal::MediaPauseRequest, move || p.set(p.get() + 1));
        f.bus.publish(Signal::LockdownEnable);
        f.bus.publish(Signal::LockdownEnable);
        assert_eq!(pauses.get(), 1);
    }

    #[test]
    fn guard_swallows_scroll_input_only_while_locked() {
        let f = fixture(styled_surface(), MemoryHost::new(1280.0, 800.0));
        let wheel = PageEvent::Wheel(WheelEvent::new(3.0).legacy());
        let left = PageEvent::Key(KeyEvent::new(KeyCode::ArrowLeft));
        let letter = PageEvent::Key(KeyEvent::new(KeyCode::Char('a')));
        assert_eq!(f.overlay.capture(&wheel), Disposition::Pass);

        f.bus.publish(Signal::LockdownEnable);
        assert_eq!(f.overlay.capture(&wheel), Disposition::Prevent);
        assert_eq!(f.overlay.capture(&PageEvent::TouchMove), Disposition::Prevent);
        assert_eq!(f.overlay.capture(&left), Disposition::Prevent);
        assert_eq!(f.overlay.capture(&letter), Disposition::Pass);
    }

    #[test]
    fn resize_reaches_decor_only_while_locked() {
        let f = fixture(styled_surface(), MemoryHost::new(1280.0, 800.0));
        f.overlay.resize(ViewportSize::new(640.0, 480.0));
        f.bus.publish(Signal::LockdownEnable);
        f.overlay.resize(ViewportSize::new(800.0, 600.0));
        assert_eq!(f.decor.borrow().resizes, vec![ViewportSize::new(800.0, 600.0)]);
    }

    #[test]
    fn blank_prior_value_is_removed() {
        let surface = MemorySurface::with_sections(800.0, 2);
        let f = fixture(surface, MemoryHost::new(1280.0, 800.0));
        f.bus.publish(Signal::LockdownEnable);
        f.bus.publish(Signal::LockdownDisable);
        let s = f.surface.borrow();
        for (property, _) in LOCKED_STYLES {
            assert_eq!(s.style(property), None, "{property} left behind");
        }
        assert_eq!(f.host.borrow().body_overflow(), None);
    }

    #[test]
    fn snapshot_restore_trims_whitespace_values() {
        let mut surface = MemorySurface::default();
        let snapshot = StyleSnapshot {
            overflow: Some("  ".to_string()),
            overscroll_behavior: Some("contain".to_string()),
            touch_action: None,
        };
        surface.set_style(StyleProperty::Overflow, "hidden");
        snapshot.restore(&mut surface);
        assert_eq!(surface.style(StyleProperty::Overflow), None);
        assert_eq!(
            surface.style(StyleProperty::OverscrollBehavior).as_deref(),
            Some("contain")
        );
    }

    struct Named(&'static str, Rc<RefCell<Vec<String>>>);

    impl LockdownDecor for Named {
        fn show(&mut self, _viewport: ViewportSize) {
            self.1.borrow_mut().push(format!("show {}", self.0));
        }
        fn hide(&mut self) {
            self.1.borrow_mut().push(format!("hide {}", self.0));
        }
    }

    #[test]
    fn paired_decors_nest_show_and_hide() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let bus = SignalBus::new();
        let host: HostHandle = Rc::new(RefCell::new(MemoryHost::new(1280.0, 800.0)));
        let overlay = LockdownOverlay::new(
            ScrollArbiter::new(SurfaceHandle::new(MemorySurface::with_sections(800.0, 3))),
            host,
            &bus,
            Box::new((Named("trail", Rc::clone(&log)), Named("sound", Rc::clone(&log)))),
        );
        bus.publish(Signal::LockdownEnable);
        overlay.resize(ViewportSize::new(390.0, 844.0));
        bus.publish(Signal::LockdownDisable);
        assert_eq!(
            *log.borrow(),
            ["show trail", "show sound", "hide sound", "hide trail"]
        );
    }
}
