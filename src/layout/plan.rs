use std::sync::Arc;

use image::RgbaImage;

use crate::{
    foundation::core::{PanelRect, Point, Rect, Rgba8},
    text::engine::TextBlock,
};

/// Resampling used when an image is drawn at a size other than its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFilter {
    /// Lanczos resampling for photographs.
    Smooth,
    /// Nearest neighbour; keeps QR module edges hard.
    Crisp,
}

#[derive(Clone, Debug)]
/// One primitive of a [`CardPlan`], in natural (unscaled) coordinates.
pub enum DrawOp {
    /// Rounded panel frame.
    Panel {
        rect: Rect,
        radius: f64,
        fill: Rgba8,
        stroke: Rgba8,
        stroke_width: f64,
    },
    Fill {
        rect: Rect,
        color: Rgba8,
    },
    Outline {
        rect: Rect,
        color: Rgba8,
        width: f64,
    },
    /// Bitmap stretched into `rect`.
    Image {
        image: Arc<RgbaImage>,
        rect: Rect,
        filter: ImageFilter,
    },
    /// Lines of `block` stacked downwards from `origin` (top-left of the first line).
    Text {
        block: TextBlock,
        origin: Point,
        line_gap: f32,
        color: Rgba8,
    },
}

#[derive(Clone, Debug)]
/// Resolved geometry of one card, ready to rasterize.
///
/// Draw ops are expressed at natural scale; the rasterizer applies `scale` uniformly.
pub struct CardPlan {
    /// Configured card width before downscaling.
    pub natural_width: u32,
    /// Content height before downscaling.
    pub natural_height: u32,
    /// Uniform downscale factor, `1.0` when the content fits `max_height`.
    pub scale: f64,
    /// Final image width.
    pub width: u32,
    /// Final image height.
    pub height: u32,
    pub left_panel: PanelRect,
    pub right_panel: PanelRect,
    pub background: Rgba8,
    pub ops: Vec<DrawOp>,
    /// Font size the URL caption settled on.
    pub url_font_px: f32,
    /// The URL caption is wider than its panel even at the floor size.
    pub url_overflows: bool,
}

impl CardPlan {
    /// Whether the composition had to be shrunk to respect `max_height`.
    pub fn is_downscaled(&self) -> bool {
        self.scale < 1.0
    }
}
