#![forbid(unsafe_code)]

//! Window-level services the page needs besides the snap surface.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use snapdeck_core::geometry::ViewportSize;

/// Window, document root, and body access.
///
/// All methods are infallible. A host without a visual viewport returns
/// `None` from [`Host::visual_viewport_height`].
pub trait Host {
    /// `window.innerWidth` / `window.innerHeight`.
    fn inner_size(&self) -> ViewportSize;

    /// `window.visualViewport.height`, if the platform has one.
    fn visual_viewport_height(&self) -> Option<f64>;

    /// Set a custom property on the document root element.
    fn set_root_property(&mut self, name: &str, value: &str);

    /// Inline `overflow` of `<body>`, `None` if unset.
    fn body_overflow(&self) -> Option<String>;

    /// Set or (with `None`) remove the inline `overflow` of `<body>`.
    fn set_body_overflow(&mut self, value: Option<&str>);

    /// `prefers-reduced-motion: reduce`.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

/// Shared host handle handed to components.
pub type HostHandle = Rc<RefCell<dyn Host>>;

/// In-memory [`Host`] for native runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    size: ViewportSize,
    visual_height: Option<f64>,
    root: BTreeMap<String, String>,
    root_writes: u64,
    body_overflow: Option<String>,
    reduced_motion: bool,
}

impl MemoryHost {
    /// A window of the given inner size without a visual viewport.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: ViewportSize::new(width, height),
            ..Self::default()
        }
    }

    /// Set the visual viewport height (builder).
    #[must_use]
    pub fn with_visual_viewport(mut self, height: f64) -> Self {
        self.visual_height = Some(height);
        self
    }

    /// Pre-set the body's inline overflow (builder).
    #[must_use]
    pub fn with_body_overflow(mut self, value: &str) -> Self {
        self.body_overflow = Some(value.to_string());
        self
    }

    /// Report reduced-motion preference (builder).
    #[must_use]
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Change the inner window size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = ViewportSize::new(width, height);
    }

    /// Change or remove the visual viewport height.
    pub fn set_visual_viewport(&mut self, height: Option<f64>) {
        self.visual_height = height;
    }

    /// Current value of a root custom property.
    #[must_use]
    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root.get(name).map(String::as_str)
    }

    /// How many root property writes happened.
    #[must_use]
    pub const fn root_writes(&self) -> u64 {
        self.root_writes
    }
}

impl Host for MemoryHost {
    fn inner_size(&self) -> ViewportSize {
        self.size
    }

    fn visual_viewport_height(&self) -> Option<f64> {
        self.visual_height
    }

    fn set_root_property(&mut self, name: &str, value: &str) {
        self.root.insert(name.to_string(), value.to_string());
        self.root_writes += 1;
    }

    fn body_overflow(&self) -> Option<String> {
        self.body_overflow.clone()
    }

    fn set_body_overflow(&mut self, value: Option<&str>) {
        self.body_overflow = value.filter(|v| !v.is_empty()).map(str::to_string);
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}
