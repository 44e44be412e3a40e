//! Property-based invariant tests for section geometry.
//!
//! 1. Targets are always inside `[0, max_offset]`.
//! 2. An unclamped target is a whole number of sections.
//! 3. Stepping forward never moves backwards, and vice versa.
//! 4. Zero and negative viewports never produce NaN.

use proptest::prelude::*;
use snapdeck_core::geometry::ScrollMetrics;

fn metrics_strategy() -> impl Strategy<Value = ScrollMetrics> {
    (1.0f64..2_000.0, 1u32..12, 0.0f64..1.0).prop_map(|(vh, sections, frac)| {
        let content = vh * f64::from(sections);
        let max = (content - vh).max(0.0);
        ScrollMetrics::new(max * frac, vh, content)
    })
}

proptest! {
    #[test]
    fn target_within_bounds(m in metrics_strategy(), dir in -1i32..=1) {
        let t = m.step(dir).target;
        prop_assert!(t >= 0.0 && t <= m.max_offset(), "target {} outside [0, {}]", t, m.max_offset());
    }

    #[test]
    fn unclamped_target_is_section_aligned(m in metrics_strategy(), dir in -1i32..=1) {
        let t = m.step(dir).target;
        if t > 0.0 && t < m.max_offset() {
            let sections = t / m.viewport_height;
            prop_assert!((sections - sections.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn direction_is_respected(m in metrics_strategy()) {
        let nearest = m.current_section() as f64 * m.viewport_height;
        prop_assert!(m.step(1).target >= m.clamp_offset(nearest));
        prop_assert!(m.step(-1).target <= m.clamp_offset(nearest));
    }

    #[test]
    fn degenerate_viewports_are_finite(
        offset in -100.0f64..100.0,
        vh in -10.0f64..=0.0,
        content in 0.0f64..100.0,
        dir in -1i32..=1,
    ) {
        let m = ScrollMetrics::new(offset, vh, content);
        prop_assert!(m.step(dir).target.is_finite());
        prop_assert!(m.jump_to(offset).target.is_finite());
    }
}
