#![forbid(unsafe_code)]

//! "System error" popup trail shown during a lockdown.
//!
//! A snake of fixed-size popups starts in the middle of the screen at a
//! random heading and walks in steps of a little over half a popup,
//! wandering a few degrees per step and bouncing off the edges. Each popup
//! sits under the previous one, fades a little more, and appears a little
//! later, so the trail reads as a cascade of error dialogs spreading across
//! the page.
//!
//! The walk stops after [`PopupTrailConfig::max_count`] popups or once
//! enough of a coarse grid over the screen has been visited.

use std::f64::consts::PI;

use snapdeck_core::geometry::ViewportSize;
use snapdeck_runtime::lockdown::LockdownDecor;

use crate::rng::XorShift64;

/// Layout knobs for the trail.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupTrailConfig {
    /// Nominal popup width in CSS pixels.
    pub popup_width: f64,
    /// Nominal popup height in CSS pixels.
    pub popup_height: f64,
    /// Hard cap on popups per layout.
    pub max_count: usize,
    /// Stop once this fraction of the coarse grid has been visited.
    pub coverage: f64,
    /// z-index of the first popup; later ones count down.
    pub first_z: i32,
}

impl Default for PopupTrailConfig {
    fn default() -> Self {
        Self {
            popup_width: 320.0,
            popup_height: 140.0,
            max_count: 2600,
            coverage: 0.92,
            first_z: 3000,
        }
    }
}

impl PopupTrailConfig {
    /// Distance between consecutive popups.
    #[must_use]
    pub fn step(&self) -> f64 {
        (self.popup_width.min(self.popup_height) * 0.55)
            .floor()
            .max(24.0)
    }

    /// Coarse coverage cell size.
    #[must_use]
    pub fn cell(&self) -> (f64, f64) {
        (
            (self.popup_width * 0.7).floor().max(72.0),
            (self.popup_height * 0.7).floor().max(60.0),
        )
    }
}

/// One placed popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Popup {
    /// Top edge in CSS pixels.
    pub top: f64,
    /// Left edge in CSS pixels.
    pub left: f64,
    /// Stacking order.
    pub z: i32,
    /// Opacity in `[0.06, 1]`.
    pub opacity: f64,
    /// Appear-animation delay in seconds.
    pub delay: f64,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl Popup {
    /// CSS `animation` shorthand for this popup.
    #[must_use]
    pub fn animation(&self) -> String {
        format!(
            "popupGlitch 0.2s ease-in-out infinite, popupAppear 0.5s {:.3}s ease-out forwards",
            self.delay
        )
    }
}

struct Coverage {
    cell_w: f64,
    cell_h: f64,
    cols: usize,
    rows: usize,
    seen: Vec<bool>,
    count: usize,
}

impl Coverage {
    fn new(viewport: ViewportSize, config: &PopupTrailConfig) -> Self {
        let (cell_w, cell_h) = config.cell();
        let cols = ((viewport.width / cell_w).ceil() as usize).max(1);
        let rows = ((viewport.height / cell_h).ceil() as usize).max(1);
        Self {
            cell_w,
            cell_h,
            cols,
            rows,
            seen: vec![false; cols * rows],
            count: 0,
        }
    }

    fn mark(&mut self, center_x: f64, center_y: f64) {
        let cx = ((center_x / self.cell_w).floor().max(0.0) as usize).min(self.cols - 1);
        let cy = ((center_y / self.cell_h).floor().max(0.0) as usize).min(self.rows - 1);
        let slot = &mut self.seen[cy * self.cols + cx];
        if !*slot {
            *slot = true;
            self.count += 1;
        }
    }

    fn fraction(&self) -> f64 {
        self.count as f64 / self.seen.len() as f64
    }
}

/// Lay out a trail for `viewport`.
pub fn generate(
    viewport: ViewportSize,
    config: &PopupTrailConfig,
    rng: &mut XorShift64,
) -> Vec<Popup> {
    let (pw, ph) = (config.popup_width, config.popup_height);
    let (sw, sh) = (viewport.width, viewport.height);
    let step = config.step();
    let mut coverage = Coverage::new(viewport, config);
    let mut popups = Vec::new();

    let mut x = ((sw - pw) / 2.0).floor().max(0.0);
    let mut y = ((sh - ph) / 2.0).floor().max(0.0);
    let mut angle = rng.next_f64() * 2.0 * PI;
    angle += rng.centered() * (PI / 6.0);

    for i in 0..config.max_count {
        let top = y.round().min(sh - ph).max(0.0);
        let left = x.round().min(sw - pw).max(0.0);
        popups.push(Popup {
            top,
            left,
            z: config.first_z - i as i32,
            opacity: (1.0 - i as f64 * 0.0025).max(0.06),
            delay: i as f64 * 0.012,
            width: (pw - 8.0).max(160.0),
            height: (ph - 8.0).max(120.0),
        });
        coverage.mark(left + pw / 2.0, top + ph / 2.0);

        angle += rng.centered() * (PI / 24.0);
        let mut next_x = x + angle.cos() * step;
        let mut next_y = y + angle.sin() * step;
        let mut bounced = false;

        if next_x < 0.0 || next_x + pw > sw {
            angle = PI - angle + rng.centered() * (PI / 18.0);
            next_x = x + angle.cos() * step;
            next_y = y + angle.sin() * step;
            bounced = true;
        }
        if next_y < 0.0 || next_y + ph > sh {
            angle = -angle + rng.centered() * (PI / 18.0);
            next_x = x + angle.cos() * step;
            next_y = y + angle.sin() * step;
            bounced = true;
        }
        if bounced {
            angle += rng.centered() * (PI / 12.0);
        }

        x = next_x;
        y = next_y;

        if coverage.fraction() >= config.coverage {
            break;
        }
    }

    snapdeck_core::debug!(
        count = popups.len(),
        coverage = coverage.fraction(),
        "popup trail laid out"
    );
    popups
}

/// Lockdown decor that lays out a popup trail.
#[derive(Debug, Clone)]
pub struct PopupTrail {
    config: PopupTrailConfig,
    rng: XorShift64,
    popups: Vec<Popup>,
    shown: bool,
    layouts: u64,
}

impl PopupTrail {
    /// A hidden trail seeded with `seed`.
    #[must_use]
    pub fn new(config: PopupTrailConfig, seed: u64) -> Self {
        Self {
            config,
            rng: XorShift64::new(seed),
            popups: Vec::new(),
            shown: false,
            layouts: 0,
        }
    }

    /// Current popups; empty while hidden.
    #[must_use]
    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    /// Whether the trail is shown.
    #[must_use]
    pub const fn is_shown(&self) -> bool {
        self.shown
    }

    /// How many layouts have been computed.
    #[must_use]
    pub const fn layout_count(&self) -> u64 {
        self.layouts
    }

    fn layout(&mut self, viewport: ViewportSize) {
        self.popups = generate(viewport, &self.config, &mut self.rng);
        self.layouts += 1;
    }
}

impl LockdownDecor for PopupTrail {
    fn show(&mut self, viewport: ViewportSize) {
        self.shown = true;
        self.layout(viewport);
    }

    fn hide(&mut self) {
        self.shown = false;
        self.popups.clear();
    }

    fn resize(&mut self, viewport: ViewportSize) {
        if self.shown {
            self.layout(viewport);
        }
    }
}
