//! Integration tests for the scroll animation module.

use proptest::prelude::*;
use snapdeck_core::animation::*;
use std::time::Duration;

const FRAME: Duration = Duration::from_micros(16_667);

#[test]
fn sixty_hz_run_completes_within_duration() {
    let mut anim = ScrollAnimation::idle();
    anim.start(0.0, 800.0, Duration::ZERO, Duration::from_millis(600));
    let mut now = Duration::ZERO;
    let mut frames = 0;
    while anim.is_running() {
        now += FRAME;
        let _ = anim.step(now);
        frames += 1;
        assert!(frames < 100, "animation never finished");
    }
    assert_eq!(frames, 36);
}

#[test]
fn easing_is_monotonic() {
    let mut prev = 0.0f64;
    for i in 0..=100 {
        let t = i as f64 / 100.0;
        let v = ease_out_cubic(t);
        assert!(v >= prev - 1e-12, "easing should be monotonic at t={t}");
        prev = v;
    }
}

#[test]
fn cancelled_animation_keeps_last_value() {
    let mut anim = ScrollAnimation::idle();
    anim.start(0.0, 800.0, Duration::ZERO, Duration::from_millis(600));
    let last = anim.step(Duration::from_millis(120)).unwrap();
    anim.cancel();
    assert_eq!(anim.step(Duration::from_millis(700)), None);
    assert!(last < 800.0);
}

proptest! {
    #[test]
    fn offsets_stay_between_endpoints(
        from in 0.0f64..10_000.0,
        to in 0.0f64..10_000.0,
        duration_ms in 1u64..2_000,
        steps in proptest::collection::vec(0u64..3_000, 1..40),
    ) {
        let mut anim = ScrollAnimation::idle();
        anim.start(from, to, Duration::ZERO, Duration::from_millis(duration_ms));
        let lo = from.min(to) - 1e-9;
        let hi = from.max(to) + 1e-9;
        let mut sorted = steps;
        sorted.sort_unstable();
        for t in sorted {
            if let Some(v) = anim.step(Duration::from_millis(t)) {
                prop_assert!(v >= lo && v <= hi, "offset {} escaped [{}, {}]", v, from, to);
            }
        }
    }

    #[test]
    fn completion_lands_exactly_on_target(
        from in -5_000.0f64..5_000.0,
        to in -5_000.0f64..5_000.0,
        duration_ms in 0u64..2_000,
    ) {
        let mut anim = ScrollAnimation::idle();
        anim.start(from, to, Duration::ZERO, Duration::from_millis(duration_ms));
        prop_assert_eq!(anim.step(Duration::from_millis(duration_ms)), Some(to));
        prop_assert_eq!(anim.state(), AnimationState::Idle);
    }
}
