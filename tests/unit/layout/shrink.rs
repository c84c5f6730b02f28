use super::*;

// Ten narrow characters measure 5.5 * size in metrics-only mode.
const URL: &str = "abcdefghij";

#[test]
fn fits_at_max_size() {
    let mut engine = TextEngine::metrics_only();
    let fitted = fit_one_line(&mut engine, URL, 110.5, &ShrinkPolicy::default());
    assert_eq!(fitted.size_px, 20.0);
    assert!(!fitted.overflows);
}

#[test]
fn shrinks_one_step_at_a_time() {
    let mut engine = TextEngine::metrics_only();
    // 5.5 * 17 = 93.5, 5.5 * 18 = 99
    let fitted = fit_one_line(&mut engine, URL, 95.0, &ShrinkPolicy::default());
    assert_eq!(fitted.size_px, 17.0);
    assert!(fitted.width <= 95.0);
}

#[test]
fn fits_at_exactly_the_floor() {
    let mut engine = TextEngine::metrics_only();
    // 5.5 * 12 = 66, 5.5 * 13 = 71.5
    let fitted = fit_one_line(&mut engine, URL, 70.0, &ShrinkPolicy::default());
    assert_eq!(fitted.size_px, 12.0);
    assert!(!fitted.overflows);
}

#[test]
fn never_goes_below_the_floor() {
    let mut engine = TextEngine::metrics_only();
    let fitted = fit_one_line(&mut engine, URL, 10.0, &ShrinkPolicy::default());
    assert_eq!(fitted.size_px, 12.0);
    assert!(fitted.overflows);
    assert!(fitted.width > 10.0);
}

fn coarse_policy() -> ShrinkPolicy {
    ShrinkPolicy {
        max_px: 20.0,
        min_px: 12.0,
        step_px: 3.0,
    }
}

#[test]
fn coarse_step_lands_on_the_floor() {
    let mut engine = TextEngine::metrics_only();
    let fitted = fit_one_line(&mut engine, URL, 10.0, &coarse_policy());
    assert_eq!(fitted.size_px, 12.0);
    assert!(fitted.overflows);
}

#[test]
fn coarse_step_fits_only_at_the_floor() {
    let mut engine = TextEngine::metrics_only();
    // 20, 17, 14 overflow (5.5 * 14 = 77); the floor gives 66.
    let fitted = fit_one_line(&mut engine, URL, 70.0, &coarse_policy());
    assert_eq!(fitted.size_px, 12.0);
    assert!((fitted.width - 66.0).abs() < 1e-3);
    assert!(!fitted.overflows);
}
