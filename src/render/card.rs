use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::{
    foundation::{core::PanelRect, error::CardResult},
    layout::plan::CardPlan,
};

/// A rendered card: owned pixels plus the geometry they were drawn from.
#[derive(Clone, Debug)]
pub struct CardImage {
    pub width: u32,
    pub height: u32,
    /// Left column, full image height.
    pub left_panel: PanelRect,
    /// Right column, full image height, starting where the left one ends.
    pub right_panel: PanelRect,
    /// Content height before any downscale.
    pub natural_height: u32,
    pub scale: f64,
    pub url_font_px: f32,
    pub url_overflows: bool,
    pixels: RgbaImage,
}

impl CardImage {
    pub(crate) fn from_plan(plan: &CardPlan, pixels: RgbaImage) -> Self {
        Self {
            width: plan.width,
            height: plan.height,
            left_panel: plan.left_panel,
            right_panel: plan.right_panel,
            natural_height: plan.natural_height,
            scale: plan.scale,
            url_font_px: plan.url_font_px,
            url_overflows: plan.url_overflows,
            pixels,
        }
    }

    /// Straight-alpha RGBA8 pixels, `width * height * 4` bytes.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> CardResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.pixels
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode card png")?;
        Ok(buf)
    }

    /// Write the card as a PNG file, creating parent directories.
    pub fn write_png(&self, path: impl AsRef<Path>) -> CardResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        image::save_buffer_with_format(
            path,
            self.pixels.as_raw(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}
