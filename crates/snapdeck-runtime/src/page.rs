#![forbid(unsafe_code)]

//! Page composition: one surface, one bus, four components.
//!
//! [`Page`] builds the shared [`SurfaceHandle`], [`SignalBus`], and
//! [`ScrollArbiter`] once and injects them into every component. The host
//! drives it with two calls:
//!
//! - [`Page::dispatch`] for each input event, returning whether to
//!   `preventDefault()`. The lockdown guard sees the event first, the way a
//!   capture-phase listener on `window` would.
//! - [`Page::frame`] once per animation frame. Components run in a fixed
//!   order: viewport metric, snap stage, navigation animation.
//!
//! Lock signals may be published at any time through [`Page::publish`]; all
//! of their effects are visible when the call returns.

use std::time::Duration;

use snapdeck_core::event::{Disposition, PageEvent};
use snapdeck_core::geometry::ViewportSize;
use snapdeck_core::signal::{LockState, Signal, UnknownSignal};

use crate::arbiter::ScrollArbiter;
use crate::bus::SignalBus;
use crate::config::{ConfigError, PageConfig};
use crate::host::HostHandle;
use crate::lockdown::{LockdownDecor, LockdownOverlay, NoDecor};
use crate::navigation::{NavMode, NavigationEnhancer};
use crate::snap::{SnapController, SnapStage};
use crate::surface::SurfaceHandle;
use crate::viewport::ViewportNormalizer;

/// What one call to [`Page::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Height published to the root property this frame.
    pub viewport_height: Option<i64>,
    /// Snap stage after this frame.
    pub snap_stage: SnapStage,
    /// Offset written by the navigation animation this frame.
    pub scroll_offset: Option<f64>,
}

/// The scroll-snap page.
pub struct Page {
    host: HostHandle,
    bus: SignalBus,
    arbiter: ScrollArbiter,
    viewport: ViewportNormalizer,
    snap: SnapController,
    navigation: NavigationEnhancer,
    lockdown: LockdownOverlay,
    mounted: bool,
    frames: u64,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("mounted", &self.mounted)
            .field("frames", &self.frames)
            .field("arbiter", &self.arbiter)
            .field("snap", &self.snap.stage())
            .field("navigation", &self.navigation)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Build a page without lockdown decor.
    pub fn new(
        config: PageConfig,
        host: HostHandle,
        surface: SurfaceHandle,
    ) -> Result<Self, ConfigError> {
        Self::with_decor(config, host, surface, Box::new(NoDecor))
    }

    /// Build a page whose lockdown shows `decor`.
    pub fn with_decor(
        config: PageConfig,
        host: HostHandle,
        surface: SurfaceHandle,
        decor: Box<dyn LockdownDecor>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let bus = SignalBus::new();
        let arbiter = ScrollArbiter::new(surface);

        // The overlay registers first so the lock state has flipped before
        // the navigation enhancer hears the same signal.
        let lockdown = LockdownOverlay::new(arbiter.clone(), host.clone(), &bus, decor);
        let navigation = NavigationEnhancer::new(arbiter.clone(), &bus, config.navigation);
        let snap = SnapController::new(arbiter.clone(), config.snap);
        let viewport = ViewportNormalizer::new(host.clone(), &config.viewport);

        Ok(Self {
            host,
            bus,
            arbiter,
            viewport,
            snap,
            navigation,
            lockdown,
            mounted: false,
            frames: 0,
        })
    }

    /// Start every component.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.viewport.mount();
        self.snap.mount();
        tracing::info!(surface = self.arbiter.surface().is_mounted(), "page mounted");
    }

    /// Stop every component. A held lock is released first.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        if self.arbiter.is_locked() {
            self.bus.publish(Signal::LockdownDisable);
        }
        self.navigation.cancel();
        self.viewport.unmount();
        self.snap.unmount();
        self.mounted = false;
        tracing::info!(frames = self.frames, "page unmounted");
    }

    /// Whether [`mount`](Self::mount) has run.
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Route one input event.
    pub fn dispatch(&mut self, event: &PageEvent, now: Duration) -> Disposition {
        if !self.mounted {
            return Disposition::Pass;
        }
        if self.lockdown.capture(event).is_prevented() {
            return Disposition::Prevent;
        }
        if event.affects_viewport() {
            self.viewport.request();
        }
        match event {
            PageEvent::Wheel(wheel) => self.navigation.wheel(wheel, now),
            PageEvent::Key(key) => self.navigation.key(key, now),
            PageEvent::Resize { width, height } => {
                self.lockdown.resize(ViewportSize::new(*width, *height));
                Disposition::Pass
            }
            PageEvent::OrientationChange => {
                let size = self.host.borrow().inner_size();
                self.lockdown.resize(size);
                Disposition::Pass
            }
            PageEvent::PageShow { persisted } => {
                self.snap.page_show(*persisted);
                Disposition::Pass
            }
            PageEvent::TouchMove | PageEvent::VisualViewport(_) => Disposition::Pass,
        }
    }

    /// Run one animation frame.
    pub fn frame(&mut self, now: Duration) -> FrameReport {
        if !self.mounted {
            return FrameReport::default();
        }
        self.frames += 1;
        let report = FrameReport {
            viewport_height: self.viewport.frame(),
            snap_stage: self.snap.frame(),
            scroll_offset: self.navigation.frame(now),
        };
        tracing::trace!(frame = self.frames, ?report, "page frame");
        report
    }

    /// Publish a signal on the page bus.
    pub fn publish(&self, signal: Signal) -> usize {
        self.bus.publish(signal)
    }

    /// Publish a signal given by name (`"lockdown:enable"`).
    pub fn publish_named(&self, name: &str) -> Result<usize, UnknownSignal> {
        let signal: Signal = name.parse()?;
        Ok(self.publish(signal))
    }

    /// The page bus, for collaborators that subscribe.
    #[must_use]
    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// The arbiter (read access and lock state).
    #[must_use]
    pub fn arbiter(&self) -> &ScrollArbiter {
        &self.arbiter
    }

    /// The surface slot.
    #[must_use]
    pub fn surface(&self) -> &SurfaceHandle {
        self.arbiter.surface()
    }

    /// Current lock state.
    #[must_use]
    pub fn lock_state(&self) -> LockState {
        self.arbiter.lock_state()
    }

    /// Navigation mode.
    #[must_use]
    pub fn nav_mode(&self) -> NavMode {
        self.navigation.mode()
    }

    /// Whether a navigation animation is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.navigation.is_animating()
    }

    /// Snap reveal stage.
    #[must_use]
    pub fn snap_stage(&self) -> SnapStage {
        self.snap.stage()
    }

    /// The viewport normalizer.
    #[must_use]
    pub fn viewport(&self) -> &ViewportNormalizer {
        &self.viewport
    }

    /// The lockdown overlay.
    #[must_use]
    pub fn lockdown(&self) -> &LockdownOverlay {
        &self.lockdown
    }

    /// Frames run since construction.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use snapdeck_core::event::{KeyCode, KeyEvent, WheelEvent};

    use super::*;
    use crate::host::{Host, MemoryHost};
    use crate::surface::{MemorySurface, ScrollSurface, StyleProperty};

    fn page() -> (Rc<RefCell<MemorySurface>>, Rc<RefCell<MemoryHost>>, Page) {
        let surface = Rc::new(RefCell::new(
            MemorySurface::with_sections(800.0, 5).with_style(StyleProperty::Overflow, "auto"),
        ));
        let host = Rc::new(RefCell::new(MemoryHost::new(1280.0, 800.0)));
        let handle: HostHandle = host.clone();
        let page = Page::new(
            PageConfig::default(),
            handle,
            SurfaceHandle::new(Rc::clone(&surface)),
        )
        .expect("default config is valid");
        (surface, host, page)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn unmounted_page_passes_everything() {
        let (_s, _h, mut page) = page();
        let e = PageEvent::Key(KeyEvent::new(KeyCode::End));
        assert_eq!(page.dispatch(&e, ms(0)), Disposition::Pass);
        assert_eq!(page.frame(ms(16)), FrameReport::default());
    }

    #[test]
    fn mount_then_two_frames_reaches_ready() {
        let (surface, host, mut page) = page();
        page.mount();
        let first = page.frame(ms(16));
        assert_eq!(first.viewport_height, Some(800));
        assert_eq!(first.snap_stage, SnapStage::Visible);
        assert_eq!(page.frame(ms(32)).snap_stage, SnapStage::Ready);
        assert!(surface.borrow().has_class("snap-mandatory"));
        assert_eq!(host.borrow().root_property("--app-height"), Some("800px"));
    }

    #[test]
    fn lock_round_trip_through_page() {
        let (surface, _h, mut page) = page();
        page.mount();
        page.frame(ms(16));
        page.frame(ms(32));

        page.dispatch(&PageEvent::Wheel(WheelEvent::new(120.0)), ms(40));
        page.frame(ms(200));
        assert_eq!(page.publish_named("lockdown:enable"), Ok(2));
        assert_eq!(page.lock_state(), LockState::Locked);
        assert_eq!(page.nav_mode(), NavMode::Suspended);
        assert!(!page.is_animating());

        let frozen = surface.borrow().scroll_top();
        let key = PageEvent::Key(KeyEvent::new(KeyCode::ArrowDown));
        assert_eq!(page.dispatch(&key, ms(300)), Disposition::Prevent);
        page.frame(ms(900));
        assert_eq!(surface.borrow().scroll_top(), frozen);

        page.publish(Signal::LockdownDisable);
        assert_eq!(
            surface.borrow().style(StyleProperty::Overflow).as_deref(),
            Some("auto")
        );
        assert_eq!(page.nav_mode(), NavMode::Active);
    }

    #[test]
    fn unknown_signal_name_is_an_error() {
        let (_s, _h, page) = page();
        assert!(page.publish_named("lockdown:maybe").is_err());
    }

    #[test]
    fn unmount_releases_lock() {
        let (surface, host, mut page) = page();
        page.mount();
        page.publish(Signal::LockdownEnable);
        page.unmount();
        assert_eq!(page.lock_state(), LockState::Unlocked);
        assert_eq!(
            surface.borrow().style(StyleProperty::Overflow).as_deref(),
            Some("auto")
        );
        assert_eq!(host.borrow().body_overflow(), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let host: HostHandle = Rc::new(RefCell::new(MemoryHost::new(10.0, 10.0)));
        let mut config = PageConfig::default();
        config.snap.classes.clear();
        assert_eq!(
            Page::new(config, host, SurfaceHandle::empty()).map(|_| ()),
            Err(ConfigError::NoSnapClasses)
        );
    }
}
