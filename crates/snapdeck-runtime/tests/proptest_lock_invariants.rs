//! Property-based invariant tests for navigation and lockdown.
//!
//! 1. Wheel noise never moves the surface.
//! 2. Any number of lock/unlock cycles restores the prior inline styles.
//! 3. While locked, no input sequence changes the offset.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use snapdeck_runtime::{
    HostHandle, KeyCode, KeyEvent, MemoryHost, MemorySurface, Modifiers, Page, PageConfig,
    PageEvent, ScrollSurface, Signal, StyleProperty, SurfaceHandle, WheelEvent,
};

fn mounted(surface: MemorySurface) -> (Rc<RefCell<MemorySurface>>, Page) {
    let surface = Rc::new(RefCell::new(surface));
    let host: HostHandle = Rc::new(RefCell::new(MemoryHost::new(1280.0, 800.0)));
    let mut page = Page::new(
        PageConfig::default(),
        host,
        SurfaceHandle::new(Rc::clone(&surface)),
    )
    .expect("default config");
    page.mount();
    page.frame(Duration::from_millis(16));
    page.frame(Duration::from_millis(32));
    (surface, page)
}

fn style_value() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("auto".to_string())),
        Just(Some("scroll".to_string())),
        Just(Some("contain".to_string())),
        Just(Some("pan-y".to_string())),
    ]
}

fn input_event() -> impl Strategy<Value = PageEvent> {
    let keys = prop_oneof![
        Just(KeyCode::ArrowUp),
        Just(KeyCode::ArrowDown),
        Just(KeyCode::ArrowLeft),
        Just(KeyCode::ArrowRight),
        Just(KeyCode::PageUp),
        Just(KeyCode::PageDown),
        Just(KeyCode::Home),
        Just(KeyCode::End),
        Just(KeyCode::Space),
        Just(KeyCode::Char('j')),
    ];
    prop_oneof![
        (-2_000.0f64..2_000.0, any::<bool>()).prop_map(|(d, legacy)| {
            let w = WheelEvent::new(d);
            PageEvent::Wheel(if legacy { w.legacy() } else { w })
        }),
        (keys, any::<bool>()).prop_map(|(code, shift)| {
            let mods = if shift { Modifiers::SHIFT } else { Modifiers::NONE };
            PageEvent::Key(KeyEvent::new(code).with_modifiers(mods))
        }),
        Just(PageEvent::TouchMove),
    ]
}

proptest! {
    #[test]
    fn wheel_noise_never_moves(
        start in 0u32..5,
        deltas in prop::collection::vec(-9.999f64..9.999, 1..40),
    ) {
        let (surface, mut page) = mounted(MemorySurface::with_sections(800.0, 5));
        surface.borrow_mut().set_scroll_top(f64::from(start) * 800.0);
        let before = surface.borrow().scroll_top();
        let mut now = Duration::from_millis(32);
        for d in deltas {
            now += Duration::from_millis(16);
            page.dispatch(&PageEvent::Wheel(WheelEvent::new(d)), now);
            page.frame(now);
        }
        prop_assert_eq!(surface.borrow().scroll_top(), before);
    }

    #[test]
    fn lock_cycles_restore_exactly(
        overflow in style_value(),
        overscroll in style_value(),
        touch in style_value(),
        cycles in 1usize..4,
        repeat_enable in any::<bool>(),
    ) {
        let mut surface = MemorySurface::with_sections(800.0, 5);
        if let Some(v) = &overflow {
            surface = surface.with_style(StyleProperty::Overflow, v);
        }
        if let Some(v) = &overscroll {
            surface = surface.with_style(StyleProperty::OverscrollBehavior, v);
        }
        if let Some(v) = &touch {
            surface = surface.with_style(StyleProperty::TouchAction, v);
        }
        let (surface, page) = mounted(surface);

        for _ in 0..cycles {
            page.publish(Signal::LockdownEnable);
            if repeat_enable {
                page.publish(Signal::LockdownEnable);
            }
            page.publish(Signal::LockdownDisable);
            let s = surface.borrow();
            prop_assert_eq!(s.style(StyleProperty::Overflow), overflow.clone());
            prop_assert_eq!(s.style(StyleProperty::OverscrollBehavior), overscroll.clone());
            prop_assert_eq!(s.style(StyleProperty::TouchAction), touch.clone());
        }
    }

    #[test]
    fn locked_offset_is_fixed(
        start in 0u32..5,
        events in prop::collection::vec(input_event(), 1..30),
    ) {
        let (surface, mut page) = mounted(MemorySurface::with_sections(800.0, 5));
        surface.borrow_mut().set_scroll_top(f64::from(start) * 800.0);
        page.publish(Signal::LockdownEnable);
        let before = surface.borrow().scroll_top();

        let mut now = Duration::from_millis(32);
        for event in &events {
            now += Duration::from_millis(40);
            let passthrough = matches!(event, PageEvent::Key(k) if !k.code.scrolls_page());
            prop_assert!(page.dispatch(event, now).is_prevented() || passthrough);
            page.frame(now);
        }
        prop_assert_eq!(surface.borrow().scroll_top(), before);
    }
}
