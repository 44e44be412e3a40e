#![forbid(unsafe_code)]

//! Step-based page runner.
//!
//! [`StepPage`] drives a [`Page`] through queued-input / frame cycles
//! without threads or blocking. The host controls the loop:
//!
//! 1. Push events via [`StepPage::push_event`] (or [`StepPage::push_json`]).
//! 2. Advance time via [`StepPage::advance_time`] or [`StepPage::set_time`].
//! 3. Call [`StepPage::step`] to dispatch the queued events and run a frame.
//!
//! Live DOM listeners need a verdict before they return, so they call
//! [`StepPage::dispatch_now`] instead of queueing.
//!
//! # Example
//!
//! ```ignore
//! let mut page = StepPage::new(WebOptions::default(), host, surface)?;
//! page.mount();
//! page.push_json(r#"{"kind":"wheel","deltaY":120}"#)?;
//! page.advance_time(Duration::from_millis(16));
//! let result = page.step();
//! ```

use core::time::Duration;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use snapdeck_core::event::{Disposition, PageEvent};
use snapdeck_core::signal::{LockState, Signal};
use snapdeck_extras::popup_trail::{PopupTrail, PopupTrailConfig};
use snapdeck_runtime::host::HostHandle;
use snapdeck_runtime::lockdown::{LockdownDecor, NoDecor};
use snapdeck_runtime::page::{FrameReport, Page};
use snapdeck_runtime::surface::SurfaceHandle;

use crate::input::parse_event;
use crate::{DeterministicClock, WebOptions, WebPageError};

/// Result of a single [`StepPage::step`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Number of queued events dispatched during this step.
    pub events_processed: u32,
    /// How many of them asked for `preventDefault()`.
    pub events_prevented: u32,
    /// What the frame did.
    pub report: FrameReport,
    /// Lock state after the step.
    pub lock_state: LockState,
    /// Current frame index (monotonically increasing).
    pub frame_idx: u64,
}

/// Host-driven, non-blocking page runner.
pub struct StepPage {
    page: Page,
    clock: DeterministicClock,
    queue: VecDeque<PageEvent>,
    popups: Option<Rc<RefCell<PopupTrail>>>,
    frame_idx: u64,
}

impl std::fmt::Debug for StepPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepPage")
            .field("page", &self.page)
            .field("now", &self.clock.now())
            .field("queued", &self.queue.len())
            .field("frame_idx", &self.frame_idx)
            .finish_non_exhaustive()
    }
}

impl StepPage {
    /// Build a page from options. The popup trail decor is installed when
    /// `options.popups` is set, seeded from `options.seed` (or 0).
    pub fn new(
        options: WebOptions,
        host: HostHandle,
        surface: SurfaceHandle,
    ) -> Result<Self, WebPageError> {
        let popups = options.popups.then(|| {
            Rc::new(RefCell::new(PopupTrail::new(
                PopupTrailConfig::default(),
                options.seed.unwrap_or(0),
            )))
        });
        let decor: Box<dyn LockdownDecor> = match &popups {
            Some(trail) => Box::new(Rc::clone(trail)),
            None => Box::new(NoDecor),
        };
        let page = Page::with_decor(options.page, host, surface, decor)?;
        Ok(Self {
            page,
            clock: DeterministicClock::new(),
            queue: VecDeque::new(),
            popups,
            frame_idx: 0,
        })
    }

    /// Mount the page.
    pub fn mount(&mut self) {
        self.page.mount();
    }

    /// Unmount the page, dropping queued input.
    pub fn unmount(&mut self) {
        self.queue.clear();
        self.page.unmount();
    }

    /// Queue a canonical event for the next step.
    pub fn push_event(&mut self, event: PageEvent) {
        self.queue.push_back(event);
    }

    /// Queue a JSON input record for the next step.
    pub fn push_json(&mut self, json: &str) -> Result<(), WebPageError> {
        let event = parse_event(json)?;
        self.push_event(event);
        Ok(())
    }

    /// Dispatch immediately at the current clock time.
    pub fn dispatch_now(&mut self, event: &PageEvent) -> Disposition {
        self.page.dispatch(event, self.clock.now())
    }

    /// Advance monotonic time by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set monotonic time (e.g. from a `requestAnimationFrame` timestamp).
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Events waiting for the next step.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Dispatch all queued events, then run one frame.
    pub fn step(&mut self) -> StepResult {
        let now = self.clock.now();
        let mut processed = 0u32;
        let mut prevented = 0u32;
        while let Some(event) = self.queue.pop_front() {
            processed += 1;
            if self.page.dispatch(&event, now).is_prevented() {
                prevented += 1;
            }
        }
        let report = self.page.frame(now);
        self.frame_idx += 1;
        tracing::trace!(
            frame_idx = self.frame_idx,
            processed,
            prevented,
            "step"
        );
        StepResult {
            events_processed: processed,
            events_prevented: prevented,
            report,
            lock_state: self.page.lock_state(),
            frame_idx: self.frame_idx,
        }
    }

    /// Publish a signal on the page bus.
    pub fn publish(&self, signal: Signal) -> usize {
        self.page.publish(signal)
    }

    /// The wrapped page.
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// The popup trail decor, if installed.
    #[must_use]
    pub fn popups(&self) -> Option<&Rc<RefCell<PopupTrail>>> {
        self.popups.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snapdeck_runtime::host::MemoryHost;
    use snapdeck_runtime::snap::SnapStage;
    use snapdeck_runtime::surface::{MemorySurface, ScrollSurface};

    fn runner(options: WebOptions) -> (Rc<RefCell<MemorySurface>>, StepPage) {
        let surface = Rc::new(RefCell::new(MemorySurface::with_sections(800.0, 4)));
        let host: HostHandle = Rc::new(RefCell::new(MemoryHost::new(1280.0, 800.0)));
        let mut page = StepPage::new(options, host, SurfaceHandle::new(Rc::clone(&surface)))
            .expect("valid options");
        page.mount();
        (surface, page)
    }

    fn run(page: &mut StepPage, frames: u32) -> StepResult {
        let mut last = page.step();
        for _ in 1..frames {
            page.advance_time(Duration::from_millis(16));
            last = page.step();
        }
        last
    }

    #[test]
    fn first_steps_reveal_the_surface() {
        let (_, mut page) = runner(WebOptions::default());
        let first = page.step();
        assert_eq!(first.report.viewport_height, Some(800));
        assert_eq!(first.report.snap_stage, SnapStage::Visible);
        page.advance_time(Duration::from_millis(16));
        assert_eq!(page.step().report.snap_stage, SnapStage::Ready);
    }

    #[test]
    fn queued_wheel_reaches_next_section() {
        let (surface, mut page) = runner(WebOptions::default());
        run(&mut page, 2);
        page.push_json(r#"{"kind":"wheel","deltaY":120}"#)
            .expect("valid record");
        assert_eq!(page.pending_events(), 1);
        let result = page.step();
        assert_eq!((result.events_processed, result.events_prevented), (1, 1));
        run(&mut page, 60);
        assert_eq!(surface.borrow().scroll_top(), 800.0);
    }

    #[test]
    fn lockdown_shows_and_clears_popups() {
        let options = WebOptions {
            seed: Some(3),
            ..WebOptions::default()
        };
        let (_, mut page) = runner(options);
        run(&mut page, 2);
        let trail = Rc::clone(page.popups().expect("decor installed"));

        page.publish(Signal::LockdownEnable);
        assert!(!trail.borrow().popups().is_empty());
        page.push_event(PageEvent::TouchMove);
        let result = page.step();
        assert_eq!(result.events_prevented, 1);
        assert_eq!(result.lock_state, LockState::Locked);

        page.publish(Signal::LockdownDisable);
        assert!(trail.borrow().popups().is_empty());
    }

    #[test]
    fn without_popups_no_decor() {
        let options = WebOptions {
            popups: false,
            ..WebOptions::default()
        };
        let (_, page) = runner(options);
        assert!(page.popups().is_none());
    }

    #[test]
    fn unmount_drops_queue() {
        let (_, mut page) = runner(WebOptions::default());
        page.push_event(PageEvent::TouchMove);
        page.unmount();
        assert_eq!(page.pending_events(), 0);
        assert!(!page.page().is_mounted());
    }
}
