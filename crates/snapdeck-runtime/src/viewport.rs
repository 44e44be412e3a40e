#![forbid(unsafe_code)]

//! Viewport height normalizer.
//!
//! Mobile browsers report a `100vh` that ignores collapsing chrome and the
//! on-screen keyboard. The normalizer measures the height actually visible
//! and publishes it as a root custom property (`--app-height: 742px`) so
//! layout can use it instead.
//!
//! Measurement requests arrive from resize, orientation, and visual-viewport
//! events, often dozens per frame. They go through a [`FrameCoalescer`]: the
//! property is written at most once per frame no matter how many requests
//! came in.

use snapdeck_core::frame_coalescer::{CoalescerStats, FrameCoalescer};

use crate::config::ViewportConfig;
use crate::host::HostHandle;

/// Publishes the effective viewport height.
pub struct ViewportNormalizer {
    host: HostHandle,
    property: String,
    pending: FrameCoalescer,
    mounted: bool,
    last: Option<i64>,
    publishes: u64,
}

impl std::fmt::Debug for ViewportNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportNormalizer")
            .field("property", &self.property)
            .field("mounted", &self.mounted)
            .field("last", &self.last)
            .field("publishes", &self.publishes)
            .finish()
    }
}

impl ViewportNormalizer {
    /// Create an unmounted normalizer writing to `host`.
    pub fn new(host: HostHandle, config: &ViewportConfig) -> Self {
        Self {
            host,
            property: config.property.clone(),
            pending: FrameCoalescer::new(),
            mounted: false,
            last: None,
            publishes: 0,
        }
    }

    /// Start listening; schedules the first measurement.
    pub fn mount(&mut self) {
        self.mounted = true;
        self.request();
    }

    /// Stop listening and drop any pending measurement.
    pub fn unmount(&mut self) {
        self.mounted = false;
        if self.pending.cancel() {
            tracing::trace!("viewport measurement dropped on unmount");
        }
    }

    /// Ask for a re-measure on the next frame.
    ///
    /// Returns `false` when one was already pending (or while unmounted).
    pub fn request(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        self.pending.request(())
    }

    /// Measure and publish if a request is pending.
    ///
    /// Returns the published height.
    pub fn frame(&mut self) -> Option<i64> {
        self.pending.take()?;
        let height = self.measure();
        let value = format!("{height}px");
        self.host
            .borrow_mut()
            .set_root_property(&self.property, &value);
        self.last = Some(height);
        self.publishes += 1;
        tracing::trace!(height, property = %self.property, "viewport height published");
        Some(height)
    }

    /// Effective height in whole pixels.
    ///
    /// Prefers a non-zero visual viewport height and falls back to the
    /// window's inner height.
    #[must_use]
    pub fn measure(&self) -> i64 {
        let host = self.host.borrow();
        let height = host
            .visual_viewport_height()
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or_else(|| host.inner_size().height);
        if height.is_finite() {
            height.round() as i64
        } else {
            0
        }
    }

    /// Last published height.
    #[must_use]
    pub const fn last_published(&self) -> Option<i64> {
        self.last
    }

    /// Number of writes to the root property.
    #[must_use]
    pub const fn publish_count(&self) -> u64 {
        self.publishes
    }

    /// Whether a measurement is waiting for the next frame.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Request coalescing counters.
    #[must_use]
    pub fn stats(&self) -> CoalescerStats {
        self.pending.stats()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::host::MemoryHost;

    fn setup(host: MemoryHost) -> (Rc<RefCell<MemoryHost>>, ViewportNormalizer) {
        let host = Rc::new(RefCell::new(host));
        let handle: HostHandle = host.clone();
        (host, ViewportNormalizer::new(handle, &ViewportConfig::default()))
    }

    #[test]
    fn mount_publishes_on_first_frame() {
        let (host, mut n) = setup(MemoryHost::new(390.0, 844.0));
        n.mount();
        assert_eq!(host.borrow().root_property("--app-height"), None);
        assert_eq!(n.frame(), Some(844));
        assert_eq!(host.borrow().root_property("--app-height"), Some("844px"));
    }

    #[test]
    fn visual_viewport_wins_when_nonzero() {
        let (host, mut n) = setup(MemoryHost::new(390.0, 844.0).with_visual_viewport(612.4));
        n.mount();
        n.frame();
        assert_eq!(host.borrow().root_property("--app-height"), Some("612px"));

        host.borrow_mut().set_visual_viewport(Some(0.0));
        n.request();
        assert_eq!(n.frame(), Some(844));
    }

    #[test]
    fn fifty_requests_one_publish() {
        let (host, mut n) = setup(MemoryHost::new(390.0, 844.0));
        n.mount();
        n.frame();
        for _ in 0..50 {
            n.request();
        }
        n.frame();
        assert_eq!(n.publish_count(), 2);
        assert_eq!(host.borrow().root_writes(), 2);
        assert_eq!(n.frame(), None);
    }

    #[test]
    fn unmount_drops_pending_request() {
        let (host, mut n) = setup(MemoryHost::new(390.0, 844.0));
        n.mount();
        n.unmount();
        assert_eq!(n.frame(), None);
        assert!(!n.request());
        assert_eq!(host.borrow().root_writes(), 0);
    }

    #[test]
    fn rounds_to_nearest_pixel() {
        let (_host, n) = setup(MemoryHost::new(390.0, 700.5));
        assert_eq!(n.measure(), 701);
    }
}
