#![forbid(unsafe_code)]

//! JSON input schema for the web host.
//!
//! The JS side forwards DOM events as small JSON records so the same stream
//! can be logged and replayed against a [`StepPage`](crate::step_page::StepPage):
//!
//! ```json
//! {"kind":"wheel","deltaY":120}
//! {"kind":"wheel","deltaY":-3,"legacy":true}
//! {"kind":"key","key":"PageDown","mods":1}
//! {"kind":"resize","width":1280,"height":720}
//! {"kind":"visual_viewport","change":"scroll"}
//! {"kind":"page_show","persisted":true}
//! ```
//!
//! `mods` is the compact modifier bitset of
//! [`Modifiers`](snapdeck_core::event::Modifiers).

use serde::{Deserialize, Serialize};
use snapdeck_core::event::{
    EventTarget, KeyCode, KeyEvent, Modifiers, PageEvent, VisualViewportChange, WheelEvent,
};

use crate::WebPageError;

fn on_surface_default() -> bool {
    true
}

/// Which visual-viewport event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportChangeKind {
    Resize,
    Scroll,
}

/// One host input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputRecord {
    Wheel {
        #[serde(rename = "deltaY")]
        delta_y: f64,
        #[serde(default)]
        legacy: bool,
        /// Whether the listener on the snap surface saw the event.
        #[serde(default = "on_surface_default", rename = "onSurface")]
        on_surface: bool,
    },
    Key {
        /// DOM `KeyboardEvent.key`.
        key: String,
        #[serde(default)]
        mods: u8,
    },
    TouchMove,
    Resize {
        width: f64,
        height: f64,
    },
    OrientationChange,
    VisualViewport {
        change: ViewportChangeKind,
    },
    PageShow {
        #[serde(default)]
        persisted: bool,
    },
}

impl InputRecord {
    /// Parse one record.
    pub fn from_json(json: &str) -> Result<Self, WebPageError> {
        serde_json::from_str(json).map_err(WebPageError::Input)
    }

    /// Encode one record.
    pub fn to_json(&self) -> Result<String, WebPageError> {
        serde_json::to_string(self).map_err(WebPageError::Input)
    }

    /// Canonical page event for this record.
    #[must_use]
    pub fn to_page_event(&self) -> PageEvent {
        match self {
            Self::Wheel {
                delta_y,
                legacy,
                on_surface,
            } => {
                let target = if *on_surface {
                    EventTarget::Surface
                } else {
                    EventTarget::Elsewhere
                };
                let wheel = WheelEvent::new(*delta_y).with_target(target);
                PageEvent::Wheel(if *legacy { wheel.legacy() } else { wheel })
            }
            Self::Key { key, mods } => PageEvent::Key(
                KeyEvent::new(KeyCode::from_dom_key(key))
                    .with_modifiers(Modifiers::from_bits_truncate(*mods)),
            ),
            Self::TouchMove => PageEvent::TouchMove,
            Self::Resize { width, height } => PageEvent::Resize {
                width: *width,
                height: *height,
            },
            Self::OrientationChange => PageEvent::OrientationChange,
            Self::VisualViewport { change } => PageEvent::VisualViewport(match change {
                ViewportChangeKind::Resize => VisualViewportChange::Resize,
                ViewportChangeKind::Scroll => VisualViewportChange::Scroll,
            }),
            Self::PageShow { persisted } => PageEvent::PageShow {
                persisted: *persisted,
            },
        }
    }
}

/// Parse one record straight to a page event.
pub fn parse_event(json: &str) -> Result<PageEvent, WebPageError> {
    InputRecord::from_json(json).map(|r| r.to_page_event())
}
