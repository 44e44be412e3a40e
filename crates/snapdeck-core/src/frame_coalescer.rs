#![forbid(unsafe_code)]

//! Per-frame coalescing of high-frequency requests.
//!
//! Mobile browsers can fire dozens of `resize` / visual-viewport `scroll`
//! events while the URL bar collapses. Doing layout work for each one
//! thrashes the page. [`FrameCoalescer`] keeps at most one pending request
//! until the next animation frame drains it.
//!
//! # Design
//!
//! "Latest wins": a request made while one is already pending replaces the
//! pending payload instead of queueing a second one. The caller drains with
//! [`FrameCoalescer::take`] from its frame callback.
//!
//! # Usage
//!
//! ```
//! use snapdeck_core::frame_coalescer::FrameCoalescer;
//!
//! let mut coalescer = FrameCoalescer::new();
//! assert!(coalescer.request(640.0));   // schedules a frame
//! assert!(!coalescer.request(700.0));  // already pending, payload replaced
//!
//! assert_eq!(coalescer.take(), Some(700.0));
//! assert_eq!(coalescer.take(), None);
//! ```

/// Coalesces requests into at most one per frame.
///
/// Not thread-safe; lives on the UI thread with the rest of the page.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T = ()> {
    pending: Option<T>,
    stats: CoalescerStats,
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Total calls to `request`.
    pub requests: u64,
    /// Requests absorbed into an already-pending one.
    pub coalesced: u64,
    /// Pending requests drained by `take`.
    pub flushes: u64,
    /// Pending requests dropped by `cancel`.
    pub cancelled: u64,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self {
            pending: None,
            stats: CoalescerStats::default(),
        }
    }
}

impl<T> FrameCoalescer<T> {
    /// Create an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request.
    ///
    /// Returns `true` if this request scheduled a new frame, `false` if it
    /// was merged into one that is already pending.
    pub fn request(&mut self, payload: T) -> bool {
        self.stats.requests += 1;
        let fresh = self.pending.is_none();
        if !fresh {
            self.stats.coalesced += 1;
        }
        self.pending = Some(payload);
        fresh
    }

    /// Drain the pending request, if any.
    pub fn take(&mut self) -> Option<T> {
        let taken = self.pending.take();
        if taken.is_some() {
            self.stats.flushes += 1;
        }
        taken
    }

    /// Drop the pending request without running it.
    pub fn cancel(&mut self) -> bool {
        let had = self.pending.take().is_some();
        if had {
            self.stats.cancelled += 1;
        }
        had
    }

    /// Whether a request is waiting for the next frame.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Diagnostic counters.
    #[inline]
    pub fn stats(&self) -> CoalescerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_requests_one_flush() {
        let mut c: FrameCoalescer = FrameCoalescer::new();
        let scheduled = (0..50).filter(|_| c.request(())).count();
        assert_eq!(scheduled, 1);
        assert_eq!(c.take(), Some(()));
        assert_eq!(c.take(), None);
        let stats = c.stats();
        assert_eq!(stats.requests, 50);
        assert_eq!(stats.coalesced, 49);
        assert_eq!(stats.flushes, 1);
    }

    #[test]
    fn latest_payload_wins() {
        let mut c = FrameCoalescer::new();
        c.request(1);
        c.request(2);
        c.request(3);
        assert_eq!(c.take(), Some(3));
    }

    #[test]
    fn new_window_after_take() {
        let mut c: FrameCoalescer = FrameCoalescer::new();
        assert!(c.request(()));
        let _ = c.take();
        assert!(c.request(()));
        assert!(c.is_pending());
    }

    #[test]
    fn cancel_drops_pending() {
        let mut c: FrameCoalescer = FrameCoalescer::new();
        assert!(!c.cancel());
        c.request(());
        assert!(c.cancel());
        assert!(!c.is_pending());
        assert_eq!(c.take(), None);
        assert_eq!(c.stats().cancelled, 1);
        assert_eq!(c.stats().flushes, 0);
    }
}
