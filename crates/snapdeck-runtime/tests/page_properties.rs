//! End-to-end behavior of a mounted page over in-memory host and surface.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use snapdeck_runtime::{
    Disposition, HostHandle, KeyCode, KeyEvent, LockState, MemoryHost, MemorySurface, NavMode,
    Page, PageConfig, PageEvent, ScrollSurface, Signal, SnapStage, StyleProperty, SurfaceHandle,
    VisualViewportChange, WheelEvent,
};

struct Harness {
    surface: Rc<RefCell<MemorySurface>>,
    host: Rc<RefCell<MemoryHost>>,
    page: Page,
    now: Duration,
}

impl Harness {
    fn new(surface: MemorySurface) -> Self {
        let surface = Rc::new(RefCell::new(surface));
        let host = Rc::new(RefCell::new(MemoryHost::new(1280.0, 800.0)));
        let host_handle: HostHandle = host.clone();
        let mut page = Page::new(
            PageConfig::default(),
            host_handle,
            SurfaceHandle::new(Rc::clone(&surface)),
        )
        .expect("default config");
        page.mount();
        let mut h = Self {
            surface,
            host,
            page,
            now: Duration::ZERO,
        };
        h.tick();
        h.tick();
        h
    }

    fn five_sections() -> Self {
        Self::new(MemorySurface::with_sections(800.0, 5))
    }

    fn tick(&mut self) {
        self.now += Duration::from_millis(16);
        self.page.frame(self.now);
    }

    fn settle(&mut self) {
        for _ in 0..60 {
            self.tick();
        }
    }

    fn send(&mut self, event: PageEvent) -> Disposition {
        self.page.dispatch(&event, self.now)
    }

    fn offset(&self) -> f64 {
        self.surface.borrow().scroll_top()
    }
}

fn wheel(delta: f64) -> PageEvent {
    PageEvent::Wheel(WheelEvent::new(delta))
}

fn key(code: KeyCode) -> PageEvent {
    PageEvent::Key(KeyEvent::new(code))
}

#[test]
fn mounted_page_is_snap_ready_after_two_frames() {
    let h = Harness::five_sections();
    assert_eq!(h.page.snap_stage(), SnapStage::Ready);
    assert_eq!(h.offset(), 0.0);
}

#[test]
fn wheel_then_small_delta_keeps_target() {
    let mut h = Harness::five_sections();
    assert_eq!(h.send(wheel(120.0)), Disposition::Prevent);
    h.tick();
    assert_eq!(h.send(wheel(5.0)), Disposition::Pass);
    h.settle();
    assert_eq!(h.offset(), 800.0);
}

#[test]
fn end_from_second_section_lands_on_max() {
    let mut h = Harness::new(MemorySurface::with_sections(800.0, 5).at_offset(800.0));
    // Mount parks at the top; move back to the second section first.
    h.send(key(KeyCode::PageDown));
    h.settle();
    assert_eq!(h.offset(), 800.0);

    h.send(key(KeyCode::End));
    h.settle();
    assert_eq!(h.offset(), 3200.0);
}

#[test]
fn enable_mid_animation_freezes_offset() {
    let mut h = Harness::five_sections();
    h.send(wheel(300.0));
    for _ in 0..10 {
        h.tick();
    }
    let at_cancel = h.offset();
    assert!(at_cancel > 0.0 && at_cancel < 800.0);

    h.page.publish(Signal::LockdownEnable);
    h.settle();
    assert_eq!(h.offset(), at_cancel);

    h.page.publish(Signal::LockdownDisable);
    h.settle();
    assert_eq!(h.offset(), at_cancel, "no catch-up scroll after unlock");
}

#[test]
fn locked_page_ignores_all_scroll_input() {
    let mut h = Harness::five_sections();
    h.page.publish(Signal::LockdownEnable);
    for event in [
        wheel(500.0),
        wheel(-500.0),
        PageEvent::Wheel(WheelEvent::new(-3.0).legacy()),
        key(KeyCode::End),
        key(KeyCode::Space),
        key(KeyCode::ArrowRight),
        PageEvent::TouchMove,
    ] {
        assert_eq!(h.send(event), Disposition::Prevent, "{event:?}");
        h.tick();
    }
    h.settle();
    assert_eq!(h.offset(), 0.0);
    assert_eq!(h.page.nav_mode(), NavMode::Suspended);
}

#[test]
fn fifty_resizes_publish_once_per_frame() {
    let mut h = Harness::five_sections();
    let before = h.page.viewport().publish_count();
    for i in 0..50 {
        h.host.borrow_mut().resize(1280.0, 700.0 + f64::from(i));
        h.send(PageEvent::Resize {
            width: 1280.0,
            height: 700.0 + f64::from(i),
        });
        h.send(PageEvent::VisualViewport(VisualViewportChange::Scroll));
    }
    h.tick();
    h.tick();
    assert_eq!(h.page.viewport().publish_count(), before + 1);
    assert_eq!(h.host.borrow().root_property("--app-height"), Some("749px"));
}

#[test]
fn lock_round_trip_restores_styles_and_pauses_media() {
    let mut h = Harness::new(
        MemorySurface::with_sections(800.0, 5)
            .with_style(StyleProperty::Overflow, "auto")
            .with_style(StyleProperty::OverscrollBehavior, "contain"),
    );
    let pauses = Rc::new(Cell::new(0u32));
    let p = Rc::clone(&pauses);
    let _player = h
        .page
        .bus()
        .on(Signal::MediaPauseRequest, move || p.set(p.get() + 1));

    h.page.publish(Signal::LockdownEnable);
    h.page.publish(Signal::LockdownEnable);
    assert_eq!(h.page.lock_state(), LockState::Locked);
    assert_eq!(pauses.get(), 1);
    h.tick();

    h.page.publish(Signal::LockdownDisable);
    h.page.publish(Signal::LockdownDisable);
    let s = h.surface.borrow();
    assert_eq!(s.style(StyleProperty::Overflow).as_deref(), Some("auto"));
    assert_eq!(s.style(StyleProperty::OverscrollBehavior).as_deref(), Some("contain"));
    assert_eq!(s.style(StyleProperty::TouchAction), None);
}

#[test]
fn page_show_from_cache_returns_to_top() {
    let mut h = Harness::five_sections();
    h.send(key(KeyCode::End));
    h.settle();
    assert_eq!(h.offset(), 3200.0);
    h.send(PageEvent::PageShow { persisted: true });
    assert_eq!(h.offset(), 0.0);
}

#[test]
fn late_surface_is_picked_up() {
    let handle = SurfaceHandle::empty();
    let host: HostHandle = Rc::new(RefCell::new(MemoryHost::new(800.0, 600.0)));
    let mut page = Page::new(PageConfig::default(), host, handle.clone()).expect("config");
    page.mount();
    assert_eq!(
        page.dispatch(&wheel(200.0), Duration::ZERO),
        Disposition::Pass
    );
    handle.attach(MemorySurface::with_sections(600.0, 3).at_offset(600.0));
    page.frame(Duration::from_millis(16));
    assert_eq!(page.snap_stage(), SnapStage::Hidden);
    assert_eq!(handle.metrics().map(|m| m.offset), Some(0.0));
}
