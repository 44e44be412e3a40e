#![forbid(unsafe_code)]

//! The snap surface: the page's single scrollable paging container.
//!
//! Components never look the surface up by themselves. The page builds one
//! [`SurfaceHandle`] and hands clones to whoever needs it. The handle is a
//! slot: it is empty until the host mounts a surface and becomes empty again
//! on unmount, and every operation on an empty slot is a no-op.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use snapdeck_core::geometry::ScrollMetrics;

/// Stable DOM marker attribute of the snap surface.
pub const SURFACE_MARKER: &str = "data-snap-container";

/// Inline style properties this layer reads or writes on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleProperty {
    /// `overflow`
    Overflow,
    /// `overscroll-behavior`
    OverscrollBehavior,
    /// `touch-action`
    TouchAction,
    /// `scroll-snap-type`
    ScrollSnapType,
    /// `opacity`
    Opacity,
    /// `pointer-events`
    PointerEvents,
    /// `transition`
    Transition,
}

impl StyleProperty {
    /// CSS property name.
    #[must_use]
    pub const fn css_name(&self) -> &'static str {
        match self {
            Self::Overflow => "overflow",
            Self::OverscrollBehavior => "overscroll-behavior",
            Self::TouchAction => "touch-action",
            Self::ScrollSnapType => "scroll-snap-type",
            Self::Opacity => "opacity",
            Self::PointerEvents => "pointer-events",
            Self::Transition => "transition",
        }
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// Operations the page needs from the scroll container.
///
/// Implemented over a DOM element by the web host and by [`MemorySurface`]
/// for native hosts and tests. Style getters return `None` for a property
/// without an inline value (the DOM's empty string).
pub trait ScrollSurface {
    /// Current `scrollTop`.
    fn scroll_top(&self) -> f64;

    /// Write `scrollTop`. Implementations clamp the way the browser does.
    fn set_scroll_top(&mut self, offset: f64);

    /// `clientHeight`.
    fn client_height(&self) -> f64;

    /// `scrollHeight`.
    fn scroll_height(&self) -> f64;

    /// Inline value of `property`, `None` if unset.
    fn style(&self, property: StyleProperty) -> Option<String>;

    /// Set an inline style value.
    fn set_style(&mut self, property: StyleProperty, value: &str);

    /// Remove an inline style value.
    fn remove_style(&mut self, property: StyleProperty);

    /// Add a class name.
    fn add_class(&mut self, class: &str);

    /// Remove a class name.
    fn remove_class(&mut self, class: &str);

    /// Whether a class name is present.
    fn has_class(&self, class: &str) -> bool;

    /// Snapshot of the scroll geometry.
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.scroll_top(), self.client_height(), self.scroll_height())
    }
}

// ---------------------------------------------------------------------------
// MemorySurface
// ---------------------------------------------------------------------------

/// In-memory [`ScrollSurface`].
///
/// Behaves like an element with `overflow-y: auto`: writes to the offset are
/// clamped to `[0, scroll_height - client_height]` and counted.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    offset: f64,
    client_height: f64,
    scroll_height: f64,
    styles: BTreeMap<StyleProperty, String>,
    classes: Vec<String>,
    writes: u64,
}

impl MemorySurface {
    /// A surface with `sections` full-viewport sections of `client_height`.
    #[must_use]
    pub fn with_sections(client_height: f64, sections: u32) -> Self {
        Self::new(client_height, client_height * f64::from(sections))
    }

    /// A surface with explicit heights.
    #[must_use]
    pub fn new(client_height: f64, scroll_height: f64) -> Self {
        Self {
            client_height,
            scroll_height,
            ..Self::default()
        }
    }

    /// Start at a given offset without counting it as a write
    /// (a browser-restored scroll position).
    #[must_use]
    pub fn at_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Pre-set an inline style (builder).
    #[must_use]
    pub fn with_style(mut self, property: StyleProperty, value: &str) -> Self {
        self.styles.insert(property, value.to_string());
        self
    }

    /// Change the container height (e.g. after a resize).
    pub fn resize(&mut self, client_height: f64, scroll_height: f64) {
        self.client_height = client_height;
        self.scroll_height = scroll_height;
        self.offset = self.metrics().clamp_offset(self.offset);
    }

    /// How many times the offset was written.
    #[must_use]
    pub const fn offset_writes(&self) -> u64 {
        self.writes
    }

    /// Current class list, in insertion order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl ScrollSurface for MemorySurface {
    fn scroll_top(&self) -> f64 {
        self.offset
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.offset = self.metrics().clamp_offset(offset);
        self.writes += 1;
    }

    fn client_height(&self) -> f64 {
        self.client_height
    }

    fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    fn style(&self, property: StyleProperty) -> Option<String> {
        self.styles.get(&property).cloned()
    }

    fn set_style(&mut self, property: StyleProperty, value: &str) {
        if value.is_empty() {
            self.styles.remove(&property);
        } else {
            self.styles.insert(property, value.to_string());
        }
    }

    fn remove_style(&mut self, property: StyleProperty) {
        self.styles.remove(&property);
    }

    fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A surface the host keeps its own reference to.
impl<S: ScrollSurface> ScrollSurface for Rc<RefCell<S>> {
    fn scroll_top(&self) -> f64 {
        self.borrow().scroll_top()
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.borrow_mut().set_scroll_top(offset);
    }

    fn client_height(&self) -> f64 {
        self.borrow().client_height()
    }

    fn scroll_height(&self) -> f64 {
        self.borrow().scroll_height()
    }

    fn style(&self, property: StyleProperty) -> Option<String> {
        self.borrow().style(property)
    }

    fn set_style(&mut self, property: StyleProperty, value: &str) {
        self.borrow_mut().set_style(property, value);
    }

    fn remove_style(&mut self, property: StyleProperty) {
        self.borrow_mut().remove_style(property);
    }

    fn add_class(&mut self, class: &str) {
        self.borrow_mut().add_class(class);
    }

    fn remove_class(&mut self, class: &str) {
        self.borrow_mut().remove_class(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.borrow().has_class(class)
    }
}

// ---------------------------------------------------------------------------
// SurfaceHandle
// ---------------------------------------------------------------------------

type Slot = Rc<RefCell<Option<Box<dyn ScrollSurface>>>>;

/// Shared slot holding the page's one scroll surface.
#[derive(Clone, Default)]
pub struct SurfaceHandle {
    slot: Slot,
}

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

impl SurfaceHandle {
    /// An empty slot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A slot already holding `surface`.
    #[must_use]
    pub fn new(surface: impl ScrollSurface + 'static) -> Self {
        let handle = Self::empty();
        handle.attach(surface);
        handle
    }

    /// Put a surface into the slot, replacing any previous one.
    pub fn attach(&self, surface: impl ScrollSurface + 'static) {
        *self.slot.borrow_mut() = Some(Box::new(surface));
    }

    /// Put an already boxed surface into the slot.
    pub fn attach_boxed(&self, surface: Box<dyn ScrollSurface>) {
        *self.slot.borrow_mut() = Some(surface);
    }

    /// Empty the slot, returning the surface that was in it.
    pub fn detach(&self) -> Option<Box<dyn ScrollSurface>> {
        self.slot.borrow_mut().take()
    }

    /// Whether a surface is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Read from the surface, if mounted.
    pub fn read<R>(&self, f: impl FnOnce(&dyn ScrollSurface) -> R) -> Option<R> {
        self.slot.borrow().as_deref().map(f)
    }

    /// Current scroll geometry, if mounted.
    #[must_use]
    pub fn metrics(&self) -> Option<ScrollMetrics> {
        self.read(|s| s.metrics())
    }

    /// Mutate the surface, if mounted.
    ///
    /// Crate-private: outside callers go through the
    /// [`ScrollArbiter`](crate::arbiter::ScrollArbiter) so that only the
    /// current authority can write.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut dyn ScrollSurface) -> R) -> Option<R> {
        let mut slot = self.slot.borrow_mut();
        match slot.as_deref_mut() {
            Some(surface) => Some(f(surface)),
            None => None,
        }
    }
}
