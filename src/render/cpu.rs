use image::{RgbaImage, imageops::FilterType};
use vello_cpu::kurbo::{Affine, Shape as _};

use crate::{
    assets::decode::prepare_image,
    foundation::{
        config::MAX_CANVAS_EDGE,
        core::{Rect, Rgba8, scale_rect, unpremultiply_rgba8_in_place},
        error::{CardError, CardResult, LayoutError},
    },
    layout::plan::{CardPlan, DrawOp, ImageFilter},
    text::engine::{ASCENT_RATIO, Glyphs, TextBlock, fallback_advance},
};

/// Rasterize `plan` into straight-alpha RGBA8 pixels of `plan.width` x `plan.height`.
pub fn rasterize(plan: &CardPlan) -> CardResult<RgbaImage> {
    let (w, h) = canvas_dims(plan.width, plan.height)?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);

    ctx.set_transform(Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(plan.background));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

    for op in &plan.ops {
        draw_op(&mut ctx, op, plan.scale)?;
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    let mut data = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_rgba8_in_place(&mut data);
    RgbaImage::from_raw(plan.width, plan.height, data)
        .ok_or_else(|| CardError::Other(anyhow::anyhow!("pixmap size does not match the plan")))
}

fn canvas_dims(width: u32, height: u32) -> Result<(u16, u16), LayoutError> {
    if width == 0 || height == 0 || width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
        return Err(LayoutError::CanvasTooLarge { width, height });
    }
    let too_large = || LayoutError::CanvasTooLarge { width, height };
    Ok((
        width.try_into().map_err(|_| too_large())?,
        height.try_into().map_err(|_| too_large())?,
    ))
}

fn draw_op(ctx: &mut vello_cpu::RenderContext, op: &DrawOp, scale: f64) -> CardResult<()> {
    ctx.set_paint_transform(Affine::IDENTITY);
    let base = Affine::scale(scale);

    match op {
        DrawOp::Panel {
            rect,
            radius,
            fill,
            stroke,
            stroke_width,
        } => {
            ctx.set_transform(base);
            let path = vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, *radius)
                .to_path(0.1);
            ctx.set_paint(color_to_cpu(*fill));
            ctx.fill_path(&path);
            ctx.set_paint(color_to_cpu(*stroke));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*stroke_width));
            ctx.stroke_path(&path);
        }
        DrawOp::Fill { rect, color } => {
            ctx.set_transform(base);
            ctx.set_paint(color_to_cpu(*color));
            ctx.fill_rect(&rect_to_cpu(*rect));
        }
        DrawOp::Outline { rect, color, width } => {
            // Stroke sits inside the rect edge.
            ctx.set_transform(base);
            ctx.set_paint(color_to_cpu(*color));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
            ctx.stroke_rect(&rect_to_cpu(rect.inset(-width * 0.5)));
        }
        DrawOp::Image {
            image,
            rect,
            filter,
        } => {
            // Resample on the CPU to the final device size, then blit 1:1.
            let device = scale_rect(*rect, scale);
            let x0 = device.x0.round();
            let y0 = device.y0.round();
            let tw = (device.width().round() as u32).max(1);
            let th = (device.height().round() as u32).max(1);
            let resized = if (tw, th) == image.dimensions() {
                image.as_ref().clone()
            } else {
                let filter = match filter {
                    ImageFilter::Smooth => FilterType::Lanczos3,
                    ImageFilter::Crisp => FilterType::Nearest,
                };
                image::imageops::resize(image.as_ref(), tw, th, filter)
            };
            let paint = image_paint(&resized)?;

            ctx.set_transform(Affine::translate((x0, y0)));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(tw),
                f64::from(th),
            ));
        }
        DrawOp::Text {
            block,
            origin,
            line_gap,
            color,
        } => {
            ctx.set_transform(base * Affine::translate((origin.x, origin.y)));
            ctx.set_paint(color_to_cpu(*color));
            draw_text(ctx, block, *line_gap);
        }
    }
    Ok(())
}

/// Draw `block` with its first line top at the current transform's origin.
fn draw_text(ctx: &mut vello_cpu::RenderContext, block: &TextBlock, line_gap: f32) {
    let step = block.size_px + line_gap;
    match &block.glyphs {
        Glyphs::Shaped { layout, font } => {
            for (i, line) in layout.lines().take(block.lines.len()).enumerate() {
                let baseline = i as f32 * step + block.size_px * ASCENT_RATIO;
                let line_baseline = line.metrics().baseline;
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: baseline + (g.y - line_baseline),
                    });
                    ctx.glyph_run(font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
        Glyphs::Boxes => {
            let size = f64::from(block.size_px);
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new((size / 14.0).max(1.0)));
            for (i, line) in block.lines.iter().enumerate() {
                let top = f64::from(i as f32 * step);
                let mut x = 0.0f64;
                for c in line.text.chars() {
                    let adv = f64::from(fallback_advance(c, block.size_px));
                    if !c.is_whitespace() {
                        let tofu = Rect::new(
                            x + adv * 0.1,
                            top + size * 0.15,
                            x + adv * 0.9,
                            top + size * 0.9,
                        );
                        ctx.stroke_rect(&rect_to_cpu(tofu));
                    }
                    x += adv;
                }
            }
        }
    }
}

fn image_paint(img: &RgbaImage) -> CardResult<vello_cpu::Image> {
    let prepared = prepare_image(img);
    let pixmap = image_premul_bytes_to_pixmap(
        prepared.rgba8_premul.as_slice(),
        prepared.width,
        prepared.height,
    )?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CardResult<vello_cpu::Pixmap> {
    let (w, h) = canvas_dims(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CardError::Other(anyhow::anyhow!(
            "prepared image byte length mismatch"
        )));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn color_to_cpu([r, g, b, a]: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
