use image::{Rgba, RgbaImage};

use crate::{
    batch::compose::RenderedCard,
    foundation::{
        core::Rgba8,
        error::{CardResult, LayoutError},
    },
};

/// Look of the merged sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Margin around and between cards.
    pub pad: u32,
    pub background: Rgba8,
    pub outline: Rgba8,
    pub outline_px: u32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            pad: 30,
            background: [245, 245, 245, 255],
            outline: [220, 220, 220, 255],
            outline_px: 2,
        }
    }
}

/// Where one card landed on the merged sheet.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManifestEntry {
    /// Position in the batch input.
    pub index: usize,
    pub file_name: String,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub url: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// All successful cards stacked in one column, input order preserved.
#[derive(Clone, Debug)]
pub struct MergedSheet {
    pub image: RgbaImage,
    pub manifest: Vec<ManifestEntry>,
}

/// Stack `cards` top to bottom, each centered horizontally, without rescaling any card.
pub fn stack_cards(cards: &[RenderedCard], cfg: &SheetConfig) -> CardResult<MergedSheet> {
    let pad = cfg.pad;
    let inner_w = cards.iter().map(|c| c.card.width).max().unwrap_or(0);
    let total_h: u64 = cards.iter().map(|c| u64::from(c.card.height)).sum();
    let width = inner_w + 2 * pad;
    let height = total_h + u64::from(pad) * (cards.len() as u64 + 1);
    let height = u32::try_from(height).map_err(|_| LayoutError::CanvasTooLarge {
        width,
        height: u32::MAX,
    })?;

    let mut image = RgbaImage::from_pixel(width.max(1), height.max(1), Rgba(cfg.background));
    let mut manifest = Vec::with_capacity(cards.len());

    let mut y = pad;
    for c in cards {
        let (w, h) = (c.card.width, c.card.height);
        let x = pad + (inner_w - w) / 2;
        image::imageops::replace(&mut image, c.card.pixels(), i64::from(x), i64::from(y));
        draw_outline(&mut image, x, y, w, h, cfg.outline_px, Rgba(cfg.outline));

        manifest.push(ManifestEntry {
            index: c.index,
            file_name: c.file_name.clone(),
            title: c.record.title.clone(),
            date: c.record.date.format("%Y-%m-%d").to_string(),
            url: c.record.source_url.clone(),
            x,
            y,
            width: w,
            height: h,
        });
        y += h + pad;
    }

    Ok(MergedSheet { image, manifest })
}

/// Draw a `px`-wide border just inside the rectangle.
fn draw_outline(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, px: u32, color: Rgba<u8>) {
    let px = px.min(w / 2).min(h / 2);
    for yy in y..y + h {
        let full_row = yy < y + px || yy >= y + h - px;
        for xx in x..x + w {
            if full_row || xx < x + px || xx >= x + w - px {
                img.put_pixel(xx, yy, color);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/sheet.rs"]
mod tests;
