use std::{borrow::Cow, sync::Arc};

use crate::{
    foundation::{
        core::Rgba8,
        error::{CardError, CardResult},
    },
    text::font::FontFace,
};

/// Baseline position as a fraction of the font size, measured from the line top.
pub const ASCENT_RATIO: f32 = 0.88;

/// Marker appended to truncated single lines.
pub const ELLIPSIS: &str = "…";

/// One laid-out line of a [`TextBlock`].
#[derive(Clone, Debug, PartialEq)]
pub struct LineBox {
    pub text: String,
    /// Horizontal advance in pixels at the block's font size.
    pub advance: f32,
}

/// How a [`TextBlock`] is drawn.
#[derive(Clone)]
pub enum Glyphs {
    /// Shaped glyph runs backed by a real font.
    Shaped {
        layout: Arc<parley::Layout<Rgba8>>,
        font: vello_cpu::peniko::FontData,
    },
    /// Metrics-only mode: one missing-glyph box per visible character.
    Boxes,
}

impl std::fmt::Debug for Glyphs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shaped { layout, .. } => f
                .debug_struct("Shaped")
                .field("layout_ptr", &Arc::as_ptr(layout))
                .finish_non_exhaustive(),
            Self::Boxes => f.write_str("Boxes"),
        }
    }
}

/// Lines of text at one font size, ready to be stacked by the layout engine.
#[derive(Clone, Debug)]
pub struct TextBlock {
    pub size_px: f32,
    pub lines: Vec<LineBox>,
    pub glyphs: Glyphs,
}

impl TextBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Widest line advance.
    pub fn width(&self) -> f32 {
        self.lines.iter().map(|l| l.advance).fold(0.0, f32::max)
    }

    /// Vertical extent when lines are stacked at `size_px + line_gap`.
    pub fn height(&self, line_gap: f32) -> f32 {
        self.lines.len() as f32 * (self.size_px + line_gap)
    }
}

/// Shapes, measures and wraps text.
///
/// With a font face, text goes through parley (UAX #14 line breaking). Without one the
/// engine runs in metrics-only mode: fixed per-character advances and character wrapping.
pub struct TextEngine {
    shaper: Option<Shaper>,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("family", &self.shaper.as_ref().map(|s| s.family.as_str()))
            .finish()
    }
}

struct Shaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl Shaper {
    fn new(face: &FontFace) -> CardResult<Self> {
        let shared: Arc<dyn AsRef<[u8]> + Send + Sync> = face.bytes().clone();
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::new(shared.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CardError::font(format!("no font families registered from '{}'", face.origin()))
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CardError::font("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::new(shared),
            face.index(),
        );

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font,
        })
    }

    fn layout(&mut self, text: &str, size_px: f32, max_width: Option<f32>) -> parley::Layout<Rgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(Rgba8::default()));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(max_width);
        layout.align(
            max_width,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        layout
    }

    fn block(&mut self, text: &str, size_px: f32, max_width: Option<f32>) -> TextBlock {
        let layout = self.layout(text, size_px, max_width);
        let lines = layout
            .lines()
            .map(|line| LineBox {
                text: text
                    .get(line.text_range())
                    .unwrap_or_default()
                    .trim_end()
                    .to_string(),
                advance: line.metrics().advance,
            })
            .collect();
        TextBlock {
            size_px,
            lines,
            glyphs: Glyphs::Shaped {
                layout: Arc::new(layout),
                font: self.font.clone(),
            },
        }
    }
}

impl TextEngine {
    /// Build an engine over `face`, or a metrics-only engine when `face` is `None`.
    pub fn new(face: Option<&FontFace>) -> CardResult<Self> {
        let shaper = face.map(Shaper::new).transpose()?;
        Ok(Self { shaper })
    }

    pub fn metrics_only() -> Self {
        Self { shaper: None }
    }

    pub fn has_font(&self) -> bool {
        self.shaper.is_some()
    }

    /// Single-line advance of `text` at `size_px`.
    pub fn measure(&mut self, text: &str, size_px: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        match &mut self.shaper {
            Some(shaper) => shaper
                .layout(text, size_px, None)
                .lines()
                .map(|l| l.metrics().advance)
                .fold(0.0, f32::max),
            None => text.chars().map(|c| fallback_advance(c, size_px)).sum(),
        }
    }

    /// Lay `text` out on one line, however wide it gets.
    pub fn single_line(&mut self, text: &str, size_px: f32) -> TextBlock {
        if text.is_empty() {
            return empty_block(size_px);
        }
        match &mut self.shaper {
            Some(shaper) => shaper.block(text, size_px, None),
            None => boxes_block(
                size_px,
                vec![LineBox {
                    text: text.to_string(),
                    advance: text.chars().map(|c| fallback_advance(c, size_px)).sum(),
                }],
            ),
        }
    }

    /// Wrap `text` into lines no wider than `max_width`, keeping at most `max_lines`.
    ///
    /// A single unbreakable run wider than `max_width` may still overflow in shaped mode.
    pub fn wrap(
        &mut self,
        text: &str,
        size_px: f32,
        max_width: f32,
        max_lines: Option<usize>,
    ) -> TextBlock {
        if text.is_empty() {
            return empty_block(size_px);
        }
        let mut block = match &mut self.shaper {
            Some(shaper) => shaper.block(text, size_px, Some(max_width)),
            None => boxes_block(size_px, wrap_chars(text, size_px, max_width)),
        };
        if let Some(max) = max_lines {
            block.lines.truncate(max);
        }
        block
    }

    /// One line no wider than `max_width`; overlong text is cut and ends in [`ELLIPSIS`].
    pub fn single_line_ellipsized(&mut self, text: &str, size_px: f32, max_width: f32) -> TextBlock {
        if self.measure(text, size_px) <= max_width {
            return self.single_line(text, size_px);
        }
        let truncated = self.truncate_to_width(text, size_px, max_width);
        self.single_line(&truncated, size_px)
    }

    /// Longest char prefix of `text` that still fits with the ellipsis appended.
    pub fn truncate_to_width(&mut self, text: &str, size_px: f32, max_width: f32) -> String {
        let chars: Vec<char> = text.chars().collect();
        let candidate = |n: usize| -> String {
            let mut s: String = chars[..n].iter().collect::<String>().trim_end().to_string();
            s.push_str(ELLIPSIS);
            s
        };

        let (mut lo, mut hi) = (0usize, chars.len());
        while lo < hi {
            let mid = (lo + hi).div_ceil(2);
            if self.measure(&candidate(mid), size_px) <= max_width {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        candidate(lo)
    }
}

fn empty_block(size_px: f32) -> TextBlock {
    TextBlock {
        size_px,
        lines: Vec::new(),
        glyphs: Glyphs::Boxes,
    }
}

fn boxes_block(size_px: f32, lines: Vec<LineBox>) -> TextBlock {
    TextBlock {
        size_px,
        lines,
        glyphs: Glyphs::Boxes,
    }
}

/// Greedy character wrapping on metrics-only advances.
fn wrap_chars(text: &str, size_px: f32, max_width: f32) -> Vec<LineBox> {
    let mut out = Vec::new();
    let mut line = String::new();
    let mut advance = 0.0f32;
    for c in text.chars() {
        let w = fallback_advance(c, size_px);
        if advance + w > max_width && !line.is_empty() {
            out.push(LineBox {
                text: std::mem::take(&mut line),
                advance,
            });
            advance = 0.0;
        }
        line.push(c);
        advance += w;
    }
    if !line.is_empty() {
        out.push(LineBox {
            text: line,
            advance,
        });
    }
    out
}

/// Metrics-only advance of one character.
pub fn fallback_advance(c: char, size_px: f32) -> f32 {
    if c.is_whitespace() {
        size_px * 0.3
    } else if is_wide(c) {
        size_px
    } else {
        size_px * 0.55
    }
}

/// East Asian wide and fullwidth ranges.
pub fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
