#![forbid(unsafe_code)]

//! Time-based scroll animation.
//!
//! [`ScrollAnimation`] is an explicit task with three states
//! ([`AnimationState`]) and a single [`step`](ScrollAnimation::step)
//! function driven by the host's monotonic frame timestamp. It never reads a
//! clock itself, so a test can replay any frame schedule exactly.
//!
//! Cancellation is the only way to stop a running animation early. It leaves
//! the last written offset in place; nothing snaps to the target.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Cubic ease-out: `1 - (1 - t)^3`.
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Linear interpolation from `a` to `b` by `t` (unclamped).
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// ---------------------------------------------------------------------------
// ScrollAnimation
// ---------------------------------------------------------------------------

/// Lifecycle of a [`ScrollAnimation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationState {
    /// Nothing scheduled, or the last run completed.
    #[default]
    Idle,
    /// Producing offsets on every step.
    Running,
    /// Aborted before completion.
    Cancelled,
}

/// Eased interpolation of a scroll offset from `from` to `to`.
#[derive(Debug, Clone, Copy)]
pub struct ScrollAnimation {
    from: f64,
    to: f64,
    started_at: Duration,
    duration: Duration,
    state: AnimationState,
}

impl Default for ScrollAnimation {
    fn default() -> Self {
        Self::idle()
    }
}

impl ScrollAnimation {
    /// An idle animation. Runs ease out cubically.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            from: 0.0,
            to: 0.0,
            started_at: Duration::ZERO,
            duration: Duration::ZERO,
            state: AnimationState::Idle,
        }
    }

    /// Start (or restart) towards `to`, beginning at `from` at time `now`.
    ///
    /// A running animation is replaced; the caller passes the surface's
    /// current offset as `from` so the new run continues without a jump.
    pub fn start(&mut self, from: f64, to: f64, now: Duration, duration: Duration) {
        self.from = from;
        self.to = to;
        self.started_at = now;
        self.duration = duration;
        self.state = AnimationState::Running;
    }

    /// Abort a running animation.
    ///
    /// Returns `true` only for the call that actually stopped it; repeated
    /// calls (or calls while idle) are no-ops.
    pub fn cancel(&mut self) -> bool {
        if self.state == AnimationState::Running {
            self.state = AnimationState::Cancelled;
            true
        } else {
            false
        }
    }

    /// Raw linear progress at `now`, in [0.0, 1.0].
    #[must_use]
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Advance to `now` and return the offset to write, if running.
    ///
    /// On the step where progress reaches 1 the exact target is returned and
    /// the animation goes back to [`AnimationState::Idle`].
    pub fn step(&mut self, now: Duration) -> Option<f64> {
        if self.state != AnimationState::Running {
            return None;
        }
        let progress = self.progress(now);
        if progress >= 1.0 {
            self.state = AnimationState::Idle;
            return Some(self.to);
        }
        Some(lerp(self.from, self.to, ease_out_cubic(progress)))
    }

    /// Current lifecycle state.
    #[inline]
    pub const fn state(&self) -> AnimationState {
        self.state
    }

    /// Whether the animation is producing offsets.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == AnimationState::Running
    }

    /// Offset the animation is heading to.
    #[inline]
    pub const fn target(&self) -> f64 {
        self.to
    }

    /// Configured duration of the current run.
    #[inline]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}
