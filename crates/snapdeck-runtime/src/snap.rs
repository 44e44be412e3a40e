#![forbid(unsafe_code)]

//! Snap surface controller.
//!
//! Browsers restore scroll positions and apply `scroll-snap-type` as soon as
//! the container exists, which makes a freshly loaded page jump to a random
//! section. The controller keeps the surface parked at the top and hidden
//! until layout has settled, then reveals it and enables snapping one frame
//! apart:
//!
//! ```text
//!  mount          frame N          frame N+1
//!  Hidden  ─────▶ Visible  ─────▶  Ready
//!  offset 0       opacity 1        snap classes
//!  opacity 0                       scroll-snap-type cleared
//!  snap none
//! ```
//!
//! All writes go through the [`ScrollArbiter`] with [`Authority::Page`].
//! While the page is locked stage transitions wait for the first frame
//! after unlock.

use crate::arbiter::{Authority, ScrollArbiter};
use crate::config::SnapConfig;
use crate::surface::StyleProperty;

/// Reveal stage of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnapStage {
    /// Not mounted, or mounted before the surface existed.
    #[default]
    Unmounted,
    /// Parked at the top, invisible, snapping disabled.
    Hidden,
    /// Visible, snapping still disabled.
    Visible,
    /// Visible with snapping enabled.
    Ready,
}

/// Drives the surface from hidden to snap-ready.
#[derive(Debug)]
pub struct SnapController {
    arbiter: ScrollArbiter,
    config: SnapConfig,
    stage: SnapStage,
    wants_mount: bool,
}

impl SnapController {
    /// Create an unmounted controller.
    pub fn new(arbiter: ScrollArbiter, config: SnapConfig) -> Self {
        Self {
            arbiter,
            config,
            stage: SnapStage::Unmounted,
            wants_mount: false,
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> SnapStage {
        self.stage
    }

    /// Whether snapping is enabled on the surface.
    #[must_use]
    pub fn is_snap_ready(&self) -> bool {
        self.stage == SnapStage::Ready
    }

    /// Park the surface: offset 0, hidden, snapping off.
    ///
    /// Without a surface the mount is retried on the next frame.
    pub fn mount(&mut self) {
        self.wants_mount = true;
        self.try_mount();
    }

    fn try_mount(&mut self) {
        let transition = self.config.transition();
        let parked = self.arbiter.write_or_log(Authority::Page, |s| {
            s.set_scroll_top(0.0);
            s.set_style(StyleProperty::Transition, &transition);
            s.set_style(StyleProperty::Opacity, "0");
            s.set_style(StyleProperty::PointerEvents, "none");
            s.set_style(StyleProperty::ScrollSnapType, "none");
        });
        if parked.is_some() {
            self.wants_mount = false;
            self.stage = SnapStage::Hidden;
            tracing::debug!("snap surface parked");
        }
    }

    /// Advance at most one stage.
    pub fn frame(&mut self) -> SnapStage {
        if self.arbiter.is_locked() {
            return self.stage;
        }
        match self.stage {
            SnapStage::Unmounted if self.wants_mount => self.try_mount(),
            SnapStage::Unmounted | SnapStage::Ready => {}
            SnapStage::Hidden => {
                let shown = self.arbiter.write_or_log(Authority::Page, |s| {
                    s.set_style(StyleProperty::Opacity, "1");
                    s.remove_style(StyleProperty::PointerEvents);
                });
                if shown.is_some() {
                    self.stage = SnapStage::Visible;
                    tracing::debug!("snap surface visible");
                }
            }
            SnapStage::Visible => {
                let classes = &self.config.classes;
                let ready = self.arbiter.write_or_log(Authority::Page, |s| {
                    for class in classes.iter().filter(|c| !c.trim().is_empty()) {
                        s.add_class(class);
                    }
                    s.remove_style(StyleProperty::ScrollSnapType);
                });
                if ready.is_some() {
                    self.stage = SnapStage::Ready;
                    tracing::debug!("snap surface ready");
                }
            }
        }
        self.stage
    }

    /// `pageshow`: a page restored from the back/forward cache starts over at
    /// the top.
    pub fn page_show(&mut self, persisted: bool) {
        if persisted {
            self.arbiter
                .write_or_log(Authority::Page, |s| s.set_scroll_top(0.0));
        }
    }

    /// Forget the surface. Styles already written stay in place.
    pub fn unmount(&mut self) {
        self.stage = SnapStage::Unmounted;
        self.wants_mount = false;
    }
}
