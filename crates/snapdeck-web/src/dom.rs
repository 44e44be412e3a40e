#![forbid(unsafe_code)]

//! Live DOM implementations of the runtime's surface and host traits.

use snapdeck_core::geometry::ViewportSize;
use snapdeck_runtime::host::Host;
use snapdeck_runtime::surface::{SURFACE_MARKER, ScrollSurface, StyleProperty};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::WebPageError;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

fn log_js_error(context: &'static str, result: Result<(), wasm_bindgen::JsValue>) {
    if let Err(err) = result {
        tracing::warn!(context, error = ?err, "DOM call failed");
    }
}

/// The browser window and its document.
pub(crate) fn window_and_document() -> Result<(Window, Document), WebPageError> {
    let window = web_sys::window().ok_or(WebPageError::MissingElement("window"))?;
    let document = window
        .document()
        .ok_or(WebPageError::MissingElement("document"))?;
    Ok((window, document))
}

/// The marked snap container, if the document has one.
pub(crate) fn find_surface(document: &Document) -> Option<DomSurface> {
    let selector = format!("[{SURFACE_MARKER}]");
    let element = document.query_selector(&selector).ok().flatten()?;
    element.dyn_into::<HtmlElement>().ok().map(DomSurface::new)
}

/// The snap container element.
#[derive(Debug, Clone)]
pub(crate) struct DomSurface {
    element: HtmlElement,
}

impl DomSurface {
    pub(crate) fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl ScrollSurface for DomSurface {
    fn scroll_top(&self) -> f64 {
        f64::from(self.element.scroll_top())
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.element.set_scroll_top(offset.round() as i32);
    }

    fn client_height(&self) -> f64 {
        f64::from(self.element.client_height())
    }

    fn scroll_height(&self) -> f64 {
        f64::from(self.element.scroll_height())
    }

    fn style(&self, property: StyleProperty) -> Option<String> {
        self.element
            .style()
            .get_property_value(property.css_name())
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_style(&mut self, property: StyleProperty, value: &str) {
        log_js_error(
            "set_style",
            self.element.style().set_property(property.css_name(), value),
        );
    }

    fn remove_style(&mut self, property: StyleProperty) {
        log_js_error(
            "remove_style",
            self.element
                .style()
                .remove_property(property.css_name())
                .map(drop),
        );
    }

    fn add_class(&mut self, class: &str) {
        log_js_error("add_class", self.element.class_list().add_1(class));
    }

    fn remove_class(&mut self, class: &str) {
        log_js_error("remove_class", self.element.class_list().remove_1(class));
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }
}

/// Window, root element and body.
#[derive(Debug, Clone)]
pub(crate) struct DomHost {
    window: Window,
    root: Option<HtmlElement>,
    body: Option<HtmlElement>,
}

impl DomHost {
    pub(crate) fn new(window: Window, document: &Document) -> Self {
        let root = document
            .document_element()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        Self {
            window,
            root,
            body: document.body(),
        }
    }

    /// Monotonic milliseconds from `performance.now()`.
    pub(crate) fn now_ms(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now())
    }
}

impl Host for DomHost {
    fn inner_size(&self) -> ViewportSize {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64());
        ViewportSize::new(width.unwrap_or(0.0), height.unwrap_or(0.0))
    }

    fn visual_viewport_height(&self) -> Option<f64> {
        self.window.visual_viewport().map(|v| v.height())
    }

    fn set_root_property(&mut self, name: &str, value: &str) {
        if let Some(root) = &self.root {
            log_js_error("set_root_property", root.style().set_property(name, value));
        }
    }

    fn body_overflow(&self) -> Option<String> {
        self.body
            .as_ref()?
            .style()
            .get_property_value("overflow")
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_body_overflow(&mut self, value: Option<&str>) {
        let Some(body) = &self.body else {
            return;
        };
        let style = body.style();
        match value.filter(|v| !v.is_empty()) {
            Some(v) => log_js_error("set_body_overflow", style.set_property("overflow", v)),
            None => log_js_error(
                "set_body_overflow",
                style.remove_property("overflow").map(drop),
            ),
        }
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .is_some_and(|m| m.matches())
    }
}
