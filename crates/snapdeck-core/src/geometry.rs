#![forbid(unsafe_code)]

//! Scroll geometry: section math for a paging container.
//!
//! Offsets and heights are CSS pixels as `f64`, matching what the DOM
//! reports for `scrollTop`, `clientHeight`, and `scrollHeight`.

/// A snapshot of the snap surface's scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current scroll offset (`scrollTop`).
    pub offset: f64,
    /// Visible height of the container (`clientHeight`).
    pub viewport_height: f64,
    /// Total scrollable content height (`scrollHeight`).
    pub content_height: f64,
}

impl ScrollMetrics {
    /// Create a new metrics snapshot.
    #[inline]
    pub const fn new(offset: f64, viewport_height: f64, content_height: f64) -> Self {
        Self {
            offset,
            viewport_height,
            content_height,
        }
    }

    /// Largest reachable offset, never negative.
    #[inline]
    pub fn max_offset(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Clamp an offset into `[0, max_offset]`.
    #[inline]
    pub fn clamp_offset(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_offset())
    }

    /// Index of the section nearest to the current offset.
    ///
    /// A zero-height viewport has a single section.
    #[inline]
    pub fn current_section(&self) -> i64 {
        if self.viewport_height <= 0.0 {
            return 0;
        }
        (self.offset / self.viewport_height).round() as i64
    }

    /// Intent to move `direction` sections away from the nearest one.
    #[must_use]
    pub fn step(&self, direction: i32) -> NavigationIntent {
        let section = self.current_section() + i64::from(direction);
        let target = self.clamp_offset(section as f64 * self.viewport_height.max(0.0));
        NavigationIntent::new(self.offset, target)
    }

    /// Intent to jump to an absolute offset (clamped).
    #[must_use]
    pub fn jump_to(&self, offset: f64) -> NavigationIntent {
        NavigationIntent::new(self.offset, self.clamp_offset(offset))
    }
}

/// Where a single input event wants the surface to go.
///
/// Derived per event, consumed immediately, then dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationIntent {
    /// Offset at the moment the event was handled.
    pub from: f64,
    /// Clamped target offset.
    pub target: f64,
}

impl NavigationIntent {
    /// Create an intent from `from` towards `target`.
    #[inline]
    pub const fn new(from: f64, target: f64) -> Self {
        Self { from, target }
    }

    /// Signed distance to travel.
    #[inline]
    pub fn travel(&self) -> f64 {
        self.target - self.from
    }

    /// Whether the intent moves strictly farther than `min_travel` pixels.
    ///
    /// Intents at or below the threshold are dropped so that repeated input
    /// at a section boundary does not restart an animation to the same spot.
    #[inline]
    pub fn exceeds(&self, min_travel: f64) -> bool {
        self.travel().abs() > min_travel
    }
}

/// Window or visual viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl ViewportSize {
    /// Create a new viewport size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero or negative.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}
