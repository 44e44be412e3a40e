#![forbid(unsafe_code)]

//! Canonical page input events.
//!
//! The host (a browser binding or a test) translates raw DOM events into
//! [`PageEvent`] values and feeds them to the page. Handlers answer with a
//! [`Disposition`] telling the host whether to call `preventDefault()`.
//!
//! # Design Notes
//!
//! - Key names follow the DOM `KeyboardEvent.key` vocabulary (see
//!   [`KeyCode::from_dom_key`]).
//! - `Modifiers` use bitflags for easy combination.
//! - Wheel deltas are in pixels; line/page delta modes are normalised by the
//!   host before the event reaches the page.

use bitflags::bitflags;

/// Canonical page input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    /// A wheel event (also used for legacy `DOMMouseScroll`).
    Wheel(WheelEvent),

    /// A keydown event.
    Key(KeyEvent),

    /// A touchmove event anywhere on the page.
    TouchMove,

    /// Window was resized.
    Resize {
        /// New inner width in CSS pixels.
        width: f64,
        /// New inner height in CSS pixels.
        height: f64,
    },

    /// Device orientation changed.
    OrientationChange,

    /// The visual viewport was resized or scrolled (on-screen keyboard,
    /// collapsing browser chrome, pinch zoom).
    VisualViewport(VisualViewportChange),

    /// `pageshow` fired. `persisted` is true when the page was restored
    /// from the back/forward cache.
    PageShow {
        /// Whether the page came from the back/forward cache.
        persisted: bool,
    },
}

impl PageEvent {
    /// Whether this event is a scroll gesture the lockdown guard swallows.
    #[must_use]
    pub const fn is_scroll_gesture(&self) -> bool {
        matches!(self, Self::Wheel(_) | Self::TouchMove)
    }

    /// Whether this event should trigger a viewport re-measure.
    #[must_use]
    pub const fn affects_viewport(&self) -> bool {
        matches!(
            self,
            Self::Resize { .. } | Self::OrientationChange | Self::VisualViewport(_)
        )
    }
}

/// Which visual-viewport event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualViewportChange {
    /// `visualViewport` `resize`.
    Resize,
    /// `visualViewport` `scroll`.
    Scroll,
}

/// Where a wheel event was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventTarget {
    /// The snap surface itself.
    #[default]
    Surface,
    /// Anything else (nested scrollers, overlays, the window).
    Elsewhere,
}

/// A wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Vertical delta in pixels. Positive scrolls down.
    pub delta_y: f64,

    /// Where the listener observed the event.
    pub target: EventTarget,

    /// Whether this came from the legacy `DOMMouseScroll` event.
    pub legacy: bool,
}

impl WheelEvent {
    /// Create a wheel event on the snap surface.
    #[must_use]
    pub const fn new(delta_y: f64) -> Self {
        Self {
            delta_y,
            target: EventTarget::Surface,
            legacy: false,
        }
    }

    /// Set the dispatch target.
    #[must_use]
    pub const fn with_target(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }

    /// Mark as a legacy `DOMMouseScroll` event.
    #[must_use]
    pub const fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }

    /// Scroll direction: `1` down, `-1` up, `0` for a zero delta.
    #[must_use]
    pub fn direction(&self) -> i32 {
        if self.delta_y > 0.0 {
            1
        } else if self.delta_y < 0.0 {
            -1
        } else {
            0
        }
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key codes relevant to page navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Up arrow key.
    ArrowUp,
    /// Down arrow key.
    ArrowDown,
    /// Left arrow key.
    ArrowLeft,
    /// Right arrow key.
    ArrowRight,
    /// Page Up key.
    PageUp,
    /// Page Down key.
    PageDown,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Space bar.
    Space,
    /// A function key (F1-F24).
    F(u8),
    /// Any other printable character.
    Char(char),
    /// A key this layer has no interest in.
    Other,
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` string.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Home" => Self::Home,
            "End" => Self::End,
            " " | "Spacebar" => Self::Space,
            _ => {
                if let Some(n) = key.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                    return Self::F(n);
                }
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }

    /// Keys whose browser default action scrolls the page.
    ///
    /// The lockdown guard swallows all of these, including the horizontal
    /// arrows the navigation enhancer itself ignores.
    #[must_use]
    pub const fn scrolls_page(&self) -> bool {
        matches!(
            self,
            Self::ArrowUp
                | Self::ArrowDown
                | Self::ArrowLeft
                | Self::ArrowRight
                | Self::PageUp
                | Self::PageDown
                | Self::Home
                | Self::End
                | Self::Space
        )
    }
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Command key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// What the host should do with the original DOM event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Disposition {
    /// Let the browser run its default action.
    #[default]
    Pass,
    /// Call `preventDefault()`.
    Prevent,
}

impl Disposition {
    /// Whether the default action must be prevented.
    #[must_use]
    pub const fn is_prevented(&self) -> bool {
        matches!(self, Self::Prevent)
    }
}
