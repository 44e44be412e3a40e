#![forbid(unsafe_code)]

//! Rotating full-bleed banner with a pointer/gyro parallax.
//!
//! # Rotation
//!
//! The banner always shows a *current* image and, while on screen, keeps a
//! *next* image queued. The next URL is the base URL with a cache-busting
//! query so the image service returns a fresh random picture each time.
//! Once the next image has loaded, the rotation timer cross-fades to it and
//! queues another.
//!
//! ```text
//!  in view, nothing queued ──▶ queue next
//!  tick, next loaded       ──▶ fade in next
//!  fade finished           ──▶ next becomes current, queue another
//!  out of view             ──▶ timer stops
//! ```
//!
//! # Parallax
//!
//! The image is scaled up slightly so it can be shifted without exposing its
//! edges. A target offset in `[-1, 1]²` comes from the mouse position over
//! the banner or from device tilt; each frame the current offset eases
//! towards it. Near the overscan limit the translation saturates instead of
//! jittering against the clamp.

use std::time::Duration;

use snapdeck_core::animation::lerp;

use crate::rng::XorShift64;

/// Default image service.
pub const DEFAULT_BANNER_URL: &str = "https://api.wenturc.com";

/// Image quality when the caller gives none.
pub const DEFAULT_QUALITY: u8 = 75;

/// Fastest allowed rotation.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1500);

fn query_separator(url: &str) -> char {
    if url.contains('?') { '&' } else { '?' }
}

/// `base` with a cache-busting `ts`/`r` query appended.
#[must_use]
pub fn cache_busted_url(base: &str, epoch_ms: u64, nonce: &str) -> String {
    format!("{base}{}ts={epoch_ms}&r={nonce}", query_separator(base))
}

/// Sized image URL for the image service (`w` and `q` parameters).
#[must_use]
pub fn image_loader_url(src: &str, width: u32, quality: Option<u8>) -> String {
    let q = quality.unwrap_or(DEFAULT_QUALITY);
    format!("{src}{}w={width}&q={q}", query_separator(src))
}

// ---------------------------------------------------------------------------
// Carousel
// ---------------------------------------------------------------------------

/// Rotation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BannerConfig {
    /// Image service URL.
    pub base_url: String,
    /// Time between rotations (never below [`MIN_INTERVAL`]).
    pub interval: Duration,
    /// Cross-fade length.
    pub fade: Duration,
    /// Minimum visible fraction to count as in view.
    pub visibility_threshold: f64,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BANNER_URL.to_string(),
            interval: Duration::from_millis(5000),
            fade: Duration::from_millis(700),
            visibility_threshold: 0.35,
        }
    }
}

impl BannerConfig {
    /// Set the image service URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the rotation interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Rotation interval after clamping.
    #[must_use]
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_INTERVAL)
    }
}

/// What the banner should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView<'a> {
    /// Image underneath.
    pub current: &'a str,
    /// Queued image, if any.
    pub next: Option<&'a str>,
    /// Whether the current image should be opaque.
    pub current_visible: bool,
    /// Whether the next image should be opaque (mid cross-fade).
    pub next_visible: bool,
}

/// Banner rotation state.
#[derive(Debug, Clone)]
pub struct Carousel {
    config: BannerConfig,
    rng: XorShift64,
    current: String,
    next: Option<String>,
    current_loaded: bool,
    next_ready: bool,
    in_view: bool,
    timer_from: Option<Duration>,
    fade_until: Option<Duration>,
    rotations: u64,
}

impl Carousel {
    /// Start on the bare base URL, out of view.
    #[must_use]
    pub fn new(config: BannerConfig, seed: u64) -> Self {
        Self {
            current: config.base_url.clone(),
            config,
            rng: XorShift64::new(seed),
            next: None,
            current_loaded: false,
            next_ready: false,
            in_view: false,
            timer_from: None,
            fade_until: None,
            rotations: 0,
        }
    }

    fn mint(&mut self, epoch_ms: u64) -> String {
        let nonce = self.rng.base36(11);
        cache_busted_url(&self.config.base_url, epoch_ms, &nonce)
    }

    /// Intersection observer callback.
    pub fn set_intersection(
        &mut self,
        intersecting: bool,
        ratio: f64,
        now: Duration,
        epoch_ms: u64,
    ) {
        let in_view = intersecting && ratio >= self.config.visibility_threshold;
        if in_view == self.in_view {
            return;
        }
        self.in_view = in_view;
        if in_view {
            self.timer_from = Some(now);
            if self.next.is_none() {
                self.next = Some(self.mint(epoch_ms));
            }
        } else {
            self.timer_from = None;
        }
        snapdeck_core::debug!(in_view, "banner visibility changed");
    }

    /// The current image finished loading.
    pub fn current_loaded(&mut self) {
        self.current_loaded = true;
    }

    /// An image finished loading. Stale URLs are ignored.
    pub fn next_loaded(&mut self, src: &str) {
        if self.next.as_deref() == Some(src) {
            self.next_ready = true;
        }
    }

    /// Advance timers. Returns `true` when the rendered view changed.
    pub fn tick(&mut self, now: Duration, epoch_ms: u64) -> bool {
        if let Some(until) = self.fade_until {
            if now >= until {
                self.promote(epoch_ms);
                return true;
            }
            return false;
        }
        let Some(from) = self.timer_from else {
            return false;
        };
        let interval = self.config.effective_interval();
        if now.saturating_sub(from) < interval {
            return false;
        }
        self.timer_from = Some(from + interval);
        if !self.next_ready {
            return false;
        }
        self.fade_until = Some(now + self.config.fade);
        true
    }

    fn promote(&mut self, epoch_ms: u64) {
        if let Some(next) = self.next.take() {
            self.current = next;
        }
        self.next = Some(self.mint(epoch_ms));
        self.fade_until = None;
        self.current_loaded = true;
        self.next_ready = false;
        self.rotations += 1;
        snapdeck_core::trace!(rotations = self.rotations, "banner rotated");
    }

    /// What to render now.
    #[must_use]
    pub fn view(&self) -> BannerView<'_> {
        let fading = self.fade_until.is_some();
        BannerView {
            current: &self.current,
            next: self.next.as_deref(),
            current_visible: !fading && self.current_loaded,
            next_visible: fading && self.next_ready,
        }
    }

    /// Whether the banner counts as on screen.
    #[must_use]
    pub const fn in_view(&self) -> bool {
        self.in_view
    }

    /// Completed rotations.
    #[must_use]
    pub const fn rotations(&self) -> u64 {
        self.rotations
    }
}

// ---------------------------------------------------------------------------
// Parallax
// ---------------------------------------------------------------------------

/// Banner box in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rect.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// `PointerEvent.pointerType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A mouse.
    Mouse,
    /// A pen.
    Pen,
    /// A finger.
    Touch,
}

/// Parallax tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxConfig {
    /// Per-frame easing factor towards the target.
    pub smoothing: f64,
    /// Translation at full deflection.
    pub move_px: f64,
    /// Image scale providing the overscan.
    pub scale: f64,
    /// Pixels of overscan kept in reserve.
    pub buffer: f64,
    /// Band inside the limit where translation saturates.
    pub freeze_band: f64,
    /// Tilt in degrees mapped to full deflection.
    pub tilt_range: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.08,
            move_px: 14.0,
            scale: 1.06,
            buffer: 3.0,
            freeze_band: 6.0,
            tilt_range: 30.0,
        }
    }
}

/// Output of one parallax frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxFrame {
    /// Eased offset in `[-1, 1]`.
    pub x: f64,
    /// Eased offset in `[-1, 1]`.
    pub y: f64,
    /// Horizontal translation in pixels.
    pub translate_x: f64,
    /// Vertical translation in pixels.
    pub translate_y: f64,
}

fn sign_or(value: f64, fallback: f64) -> f64 {
    if value == 0.0 { fallback.signum() } else { value.signum() }
}

/// Clamp one axis, holding at `boundary` while pushing outwards.
fn saturate(desired: f64, previous: f64, max: f64, boundary: f64) -> f64 {
    let mut t = desired;
    let outward = desired.abs() >= previous.abs()
        && sign_or(desired, 1.0) == sign_or(previous, sign_or(desired, 1.0));
    if desired.abs() > boundary && outward {
        t = desired.signum() * boundary;
    }
    t.clamp(-max, max)
}

/// Pointer/tilt parallax state.
#[derive(Debug, Clone, Default)]
pub struct Parallax {
    config: ParallaxConfig,
    enabled: bool,
    target: (f64, f64),
    current: (f64, f64),
    last: (f64, f64),
}

impl Parallax {
    /// Disabled until [`set_active`](Self::set_active).
    #[must_use]
    pub fn new(config: ParallaxConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Enable while in view and motion is allowed.
    ///
    /// Disabling recentres everything.
    pub fn set_active(&mut self, in_view: bool, reduced_motion: bool) {
        let enabled = in_view && !reduced_motion;
        if !enabled {
            self.target = (0.0, 0.0);
            self.current = (0.0, 0.0);
            self.last = (0.0, 0.0);
        }
        self.enabled = enabled;
    }

    /// Whether frames produce transforms.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pointer moved over the banner. Only mice steer.
    pub fn pointer_move(&mut self, kind: PointerKind, client_x: f64, client_y: f64, rect: Rect) {
        if !self.enabled || kind != PointerKind::Mouse || rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let cx = rect.left + rect.width / 2.0;
        let cy = rect.top + rect.height / 2.0;
        self.target = (
            ((client_x - cx) / (rect.width / 2.0)).clamp(-1.0, 1.0),
            ((client_y - cy) / (rect.height / 2.0)).clamp(-1.0, 1.0),
        );
    }

    /// Pointer left the banner.
    pub fn pointer_leave(&mut self) {
        self.target = (0.0, 0.0);
    }

    /// `deviceorientation` reading. Missing axes count as level.
    pub fn orientation(&mut self, gamma: Option<f64>, beta: Option<f64>) {
        if !self.enabled {
            return;
        }
        let range = self.config.tilt_range;
        self.target = (
            (gamma.unwrap_or(0.0) / range).clamp(-1.0, 1.0),
            (beta.unwrap_or(0.0) / range).clamp(-1.0, 1.0),
        );
    }

    /// Ease towards the target and compute the translation for a banner of
    /// `width` × `height`.
    pub fn frame(&mut self, width: f64, height: f64) -> Option<ParallaxFrame> {
        if !self.enabled {
            return None;
        }
        let c = &self.config;
        self.current = (
            lerp(self.current.0, self.target.0, c.smoothing),
            lerp(self.current.1, self.target.1, c.smoothing),
        );
        let overscan = c.scale - 1.0;
        let max_x = (overscan * width * 0.5 - c.buffer).max(0.0);
        let max_y = (overscan * height * 0.5 - c.buffer).max(0.0);
        let tx = saturate(
            self.current.0 * c.move_px,
            self.last.0,
            max_x,
            (max_x - c.freeze_band).max(0.0),
        );
        let ty = saturate(
            self.current.1 * c.move_px,
            self.last.1,
            max_y,
            (max_y - c.freeze_band).max(0.0),
        );
        self.last = (tx, ty);
        Some(ParallaxFrame {
            x: self.current.0,
            y: self.current.1,
            translate_x: tx,
            translate_y: ty,
        })
    }

    /// CSS `transform` for a frame.
    #[must_use]
    pub fn transform(&self, frame: &ParallaxFrame) -> String {
        format!(
            "scale({}) translate3d({}px, {}px, 0)",
            self.config.scale, frame.translate_x, frame.translate_y
        )
    }
}
