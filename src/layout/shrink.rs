use crate::{foundation::config::ShrinkPolicy, text::engine::TextEngine};

/// Outcome of [`fit_one_line`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FittedLine {
    pub size_px: f32,
    /// Measured advance at `size_px`.
    pub width: f32,
    /// The floor was reached and the line is still wider than allowed.
    pub overflows: bool,
}

/// Shrink `text` one step at a time until it fits on one line of `max_width`.
///
/// Starts at `policy.max_px`; never goes below `policy.min_px`, and always tries the floor
/// itself before giving up. At the floor the line is
/// accepted as is, so callers must not wrap or truncate it afterwards.
pub fn fit_one_line(
    engine: &mut TextEngine,
    text: &str,
    max_width: f32,
    policy: &ShrinkPolicy,
) -> FittedLine {
    let mut size_px = policy.max_px;
    loop {
        let width = engine.measure(text, size_px);
        if width <= max_width {
            return FittedLine {
                size_px,
                width,
                overflows: false,
            };
        }
        if policy.step_px <= 0.0 || size_px <= policy.min_px {
            return FittedLine {
                size_px,
                width,
                overflows: true,
            };
        }
        // A step that would skip past the floor lands on it instead.
        size_px = (size_px - policy.step_px).max(policy.min_px);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/shrink.rs"]
mod tests;
