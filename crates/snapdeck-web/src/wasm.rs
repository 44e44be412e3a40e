#![forbid(unsafe_code)]

use core::time::Duration;
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use snapdeck_core::event::{
    EventTarget, KeyCode, KeyEvent, Modifiers, PageEvent, VisualViewportChange, WheelEvent,
};
use snapdeck_core::signal::Signal;
use snapdeck_runtime::bus::Subscription;
use snapdeck_runtime::host::HostHandle;
use snapdeck_runtime::surface::SurfaceHandle;
use wasm_bindgen::prelude::*;

use crate::dom::{DomHost, find_surface, window_and_document};
use crate::input::parse_event;
use crate::step_page::StepPage;
use crate::{WebOptions, WebPageError};

fn to_js(err: WebPageError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn ms(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value / 1000.0)
    } else {
        Duration::ZERO
    }
}

/// Scroll-snap page bound to the live document.
///
/// Every input entry point returns `true` when the caller should call
/// `preventDefault()` on the DOM event it came from.
#[wasm_bindgen]
pub struct SnapdeckPage {
    runner: StepPage,
    host: Rc<RefCell<DomHost>>,
    surface: SurfaceHandle,
    listeners: Vec<Subscription>,
}

#[wasm_bindgen]
impl SnapdeckPage {
    /// Build a page from a JSON options string (empty for defaults).
    ///
    /// The snap container is looked up by its marker attribute; when it is
    /// not in the document yet, call `attachSurface` once it is.
    #[wasm_bindgen(constructor)]
    pub fn new(options: &str) -> Result<SnapdeckPage, JsValue> {
        let mut options = WebOptions::parse(options).map_err(to_js)?;
        let (window, document) = window_and_document().map_err(to_js)?;
        let host = Rc::new(RefCell::new(DomHost::new(window, &document)));
        if options.seed.is_none() {
            options.seed = Some(host.borrow().now_ms().to_bits());
        }
        let surface = find_surface(&document).map_or_else(SurfaceHandle::empty, SurfaceHandle::new);
        let host_handle: HostHandle = host.clone();
        let runner = StepPage::new(options, host_handle, surface.clone()).map_err(to_js)?;
        Ok(Self {
            runner,
            host,
            surface,
            listeners: Vec::new(),
        })
    }

    /// Start every component.
    pub fn mount(&mut self) {
        self.runner.mount();
    }

    /// Look the snap container up again. Returns whether one is attached.
    #[wasm_bindgen(js_name = attachSurface)]
    pub fn attach_surface(&mut self) -> Result<bool, JsValue> {
        if self.surface.is_mounted() {
            return Ok(true);
        }
        let (_, document) = window_and_document().map_err(to_js)?;
        Ok(match find_surface(&document) {
            Some(surface) => {
                self.surface.attach(surface);
                true
            }
            None => false,
        })
    }

    fn dispatch(&mut self, event: PageEvent) -> bool {
        let now = self.host.borrow().now_ms();
        self.runner.set_time(ms(now));
        self.runner.dispatch_now(&event).is_prevented()
    }

    /// `wheel` (or legacy `DOMMouseScroll`) event.
    pub fn wheel(&mut self, delta_y: f64, legacy: bool, on_surface: bool) -> bool {
        let target = if on_surface {
            EventTarget::Surface
        } else {
            EventTarget::Elsewhere
        };
        let wheel = WheelEvent::new(delta_y).with_target(target);
        self.dispatch(PageEvent::Wheel(if legacy { wheel.legacy() } else { wheel }))
    }

    /// `keydown` event; `key` is `KeyboardEvent.key`.
    pub fn key(&mut self, key: &str, shift: bool) -> bool {
        let mods = if shift { Modifiers::SHIFT } else { Modifiers::NONE };
        self.dispatch(PageEvent::Key(
            KeyEvent::new(KeyCode::from_dom_key(key)).with_modifiers(mods),
        ))
    }

    /// `touchmove` event.
    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self) -> bool {
        self.dispatch(PageEvent::TouchMove)
    }

    /// Window `resize`.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.dispatch(PageEvent::Resize { width, height });
    }

    /// `orientationchange`.
    #[wasm_bindgen(js_name = orientationChange)]
    pub fn orientation_change(&mut self) {
        self.dispatch(PageEvent::OrientationChange);
    }

    /// `visualViewport` `resize` or `scroll`.
    #[wasm_bindgen(js_name = visualViewport)]
    pub fn visual_viewport(&mut self, scrolled: bool) {
        let change = if scrolled {
            VisualViewportChange::Scroll
        } else {
            VisualViewportChange::Resize
        };
        self.dispatch(PageEvent::VisualViewport(change));
    }

    /// `pageshow`.
    #[wasm_bindgen(js_name = pageShow)]
    pub fn page_show(&mut self, persisted: bool) {
        self.dispatch(PageEvent::PageShow { persisted });
    }

    /// Any event as a JSON input record.
    pub fn input(&mut self, record: &str) -> Result<bool, JsValue> {
        let event = parse_event(record).map_err(to_js)?;
        Ok(self.dispatch(event))
    }

    /// Run one frame at a `requestAnimationFrame` timestamp.
    pub fn frame(&mut self, timestamp_ms: f64) {
        self.runner.set_time(ms(timestamp_ms));
        self.runner.step();
    }

    /// Engage the lockdown.
    #[wasm_bindgen(js_name = lockdownEnable)]
    pub fn lockdown_enable(&self) {
        self.runner.publish(Signal::LockdownEnable);
    }

    /// Release the lockdown.
    #[wasm_bindgen(js_name = lockdownDisable)]
    pub fn lockdown_disable(&self) {
        self.runner.publish(Signal::LockdownDisable);
    }

    /// Publish a signal by wire name. Returns the number of listeners.
    pub fn publish(&self, name: &str) -> Result<u32, JsValue> {
        self.runner
            .page()
            .publish_named(name)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Call `callback` whenever media should pause.
    #[wasm_bindgen(js_name = onMediaPause)]
    pub fn on_media_pause(&mut self, callback: Function) {
        let sub = self.runner.page().bus().on(Signal::MediaPauseRequest, move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                tracing::warn!(error = ?err, "media pause callback threw");
            }
        });
        self.listeners.push(sub);
    }

    /// Whether the lockdown is engaged.
    #[wasm_bindgen(getter, js_name = isLocked)]
    pub fn is_locked(&self) -> bool {
        self.runner.page().lock_state().is_locked()
    }

    /// Current popup layout as JSON (`[]` when hidden).
    pub fn popups(&self) -> String {
        let Some(trail) = self.runner.popups() else {
            return "[]".to_string();
        };
        let items: Vec<serde_json::Value> = trail
            .borrow()
            .popups()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "top": p.top,
                    "left": p.left,
                    "z": p.z,
                    "opacity": p.opacity,
                    "width": p.width,
                    "height": p.height,
                    "animation": p.animation(),
                })
            })
            .collect();
        serde_json::Value::Array(items).to_string()
    }

    /// Explicit teardown for JS callers.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.runner.unmount();
        self.surface.detach();
    }
}
