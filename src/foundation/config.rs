use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::{
    core::Rgba8,
    error::{CardError, CardResult, LayoutError},
};

/// Largest canvas edge the CPU rasterizer accepts.
pub const MAX_CANVAS_EDGE: u32 = u16::MAX as u32;

/// Auto-shrink policy for text that must stay on one unbroken line.
///
/// These are configuration constants, not derived values: the engine starts at `max_px`,
/// steps down by `step_px`, and never goes below `min_px`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShrinkPolicy {
    /// Starting font size.
    pub max_px: f32,
    /// Floor font size; the line is accepted here even if it overflows.
    pub min_px: f32,
    /// Decrement per attempt.
    pub step_px: f32,
}

impl Default for ShrinkPolicy {
    fn default() -> Self {
        Self {
            max_px: 20.0,
            min_px: 12.0,
            step_px: 1.0,
        }
    }
}

impl ShrinkPolicy {
    /// Reject non-finite, non-positive or inverted bounds.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let finite = self.max_px.is_finite() && self.min_px.is_finite() && self.step_px.is_finite();
        if !finite || self.min_px <= 0.0 || self.step_px <= 0.0 {
            return Err(LayoutError::InvalidConfig(
                "url_font sizes and step must be finite and > 0".into(),
            ));
        }
        if self.min_px > self.max_px {
            return Err(LayoutError::InvalidConfig(
                "url_font.min_px must be <= url_font.max_px".into(),
            ));
        }
        Ok(())
    }
}

/// Font sizes of the card's text roles, in pixels at natural scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontSizes {
    /// Release date caption.
    pub date_px: f32,
    /// Release title.
    pub title_px: f32,
    /// Tracklist header and track titles.
    pub body_px: f32,
    /// Artist line.
    pub small_px: f32,
    /// Staff credit lines.
    pub staff_px: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            date_px: 30.0,
            title_px: 34.0,
            body_px: 26.0,
            small_px: 20.0,
            staff_px: 22.0,
        }
    }
}

/// Fixed vertical margins between stacked elements.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Spacing {
    pub date_line_gap: f32,
    pub title_line_gap: f32,
    pub small_line_gap: f32,
    pub body_line_gap: f32,
    pub staff_line_gap: f32,
    pub after_artist: f32,
    pub after_header: f32,
    pub after_track: f32,
    pub before_cover: f32,
    pub before_qr: f32,
    pub before_url: f32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            date_line_gap: 6.0,
            title_line_gap: 4.0,
            small_line_gap: 3.0,
            body_line_gap: 2.0,
            staff_line_gap: 2.0,
            after_artist: 8.0,
            after_header: 8.0,
            after_track: 8.0,
            before_cover: 10.0,
            before_qr: 18.0,
            before_url: 8.0,
        }
    }
}

/// Card colors (straight RGBA8).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub background: Rgba8,
    pub panel_fill: Rgba8,
    pub panel_stroke: Rgba8,
    pub frame: Rgba8,
    pub placeholder: Rgba8,
    pub date: Rgba8,
    pub title: Rgba8,
    pub artist: Rgba8,
    pub header: Rgba8,
    pub track: Rgba8,
    pub staff: Rgba8,
    pub url: Rgba8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [250, 250, 250, 255],
            panel_fill: [255, 255, 255, 255],
            panel_stroke: [225, 225, 225, 255],
            frame: [210, 210, 210, 255],
            placeholder: [236, 236, 236, 255],
            date: [60, 60, 60, 255],
            title: [20, 20, 20, 255],
            artist: [50, 50, 50, 255],
            header: [10, 10, 10, 255],
            track: [30, 30, 30, 255],
            staff: [95, 95, 95, 255],
            url: [80, 80, 80, 255],
        }
    }
}

/// Layout and rendering configuration for one card.
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardConfig {
    /// Natural card width in pixels.
    pub width: u32,
    /// Upper bound on the final card height; taller content is downscaled uniformly.
    pub max_height: u32,
    /// Font file with CJK coverage. Without it the system font database is queried.
    pub font: Option<PathBuf>,
    /// Outer margin around both panels.
    pub pad: f32,
    /// Width of the left panel frame.
    pub left_width: f32,
    /// Horizontal gap between the two panel frames.
    pub panel_gap: f32,
    /// Horizontal text inset inside a panel frame.
    pub inner_pad_x: f32,
    /// Top inset inside a panel frame.
    pub inner_pad_top: f32,
    /// Bottom inset inside a panel frame.
    pub inner_pad_bottom: f32,
    /// Corner radius of the panel frames.
    pub panel_radius: f32,
    /// Edge length of the QR bitmap.
    pub qr_size: u32,
    /// Extra indent of staff lines relative to track titles.
    pub staff_indent: f32,
    /// Maximum wrapped lines per staff credit.
    pub staff_max_lines: usize,
    /// Label printed before the release date.
    pub date_label: String,
    /// Header printed above a non-empty tracklist.
    pub tracklist_header: String,
    pub fonts: FontSizes,
    pub spacing: Spacing,
    pub palette: Palette,
    /// Auto-shrink policy of the URL caption.
    pub url_font: ShrinkPolicy,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            max_height: 1500,
            font: None,
            pad: 30.0,
            left_width: 430.0,
            panel_gap: 30.0,
            inner_pad_x: 20.0,
            inner_pad_top: 18.0,
            inner_pad_bottom: 18.0,
            panel_radius: 18.0,
            qr_size: 190,
            staff_indent: 20.0,
            staff_max_lines: 2,
            date_label: "発売日：".to_string(),
            tracklist_header: "曲目 / Staff".to_string(),
            fonts: FontSizes::default(),
            spacing: Spacing::default(),
            palette: Palette::default(),
            url_font: ShrinkPolicy::default(),
        }
    }
}

/// Panel geometry derived from a [`CardConfig`], at natural scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelGeometry {
    pub left_x: f64,
    pub left_w: f64,
    pub right_x: f64,
    pub right_w: f64,
    /// Column boundary between the left and right panel regions.
    pub split: f64,
    /// Usable text width inside the left frame.
    pub left_text_w: f64,
    /// Usable text width inside the right frame.
    pub right_text_w: f64,
    /// Edge length of the square cover box.
    pub cover_side: f64,
}

impl CardConfig {
    /// Load a configuration file (JSON). Missing keys keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> CardResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(s: &str) -> CardResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| CardError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every value the layout engine relies on.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.width == 0 || self.width > MAX_CANVAS_EDGE {
            return Err(LayoutError::InvalidConfig(format!(
                "width must be in 1..={MAX_CANVAS_EDGE}"
            )));
        }
        if self.max_height == 0 || self.max_height > MAX_CANVAS_EDGE {
            return Err(LayoutError::InvalidConfig(format!(
                "max_height must be in 1..={MAX_CANVAS_EDGE}"
            )));
        }
        let sizes = [
            self.fonts.date_px,
            self.fonts.title_px,
            self.fonts.body_px,
            self.fonts.small_px,
            self.fonts.staff_px,
        ];
        if sizes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(LayoutError::InvalidConfig(
                "font sizes must be finite and > 0".into(),
            ));
        }
        if self.qr_size == 0 {
            return Err(LayoutError::InvalidConfig("qr_size must be > 0".into()));
        }
        self.url_font.validate()?;

        let g = self.geometry();
        if g.left_text_w <= 0.0 || g.right_text_w <= 0.0 {
            return Err(LayoutError::ZeroPanelWidth);
        }
        if g.right_text_w - f64::from(self.staff_indent) <= 0.0 {
            return Err(LayoutError::ZeroPanelWidth);
        }
        Ok(())
    }

    /// Derive panel columns and text widths. Values may be non-positive for a config that
    /// fails [`CardConfig::validate`].
    pub fn geometry(&self) -> PanelGeometry {
        let pad = f64::from(self.pad);
        let inner = f64::from(self.inner_pad_x);
        let left_x = pad;
        let left_w = f64::from(self.left_width);
        let right_x = pad + left_w + f64::from(self.panel_gap);
        let right_w = f64::from(self.width) - right_x - pad;
        PanelGeometry {
            left_x,
            left_w,
            right_x,
            right_w,
            split: pad + left_w + f64::from(self.panel_gap) * 0.5,
            left_text_w: left_w - 2.0 * inner,
            right_text_w: right_w - 2.0 * inner,
            cover_side: left_w - 2.0 * inner,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
