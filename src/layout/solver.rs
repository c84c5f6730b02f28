use crate::{
    assets::resolve::{CardAssets, Cover},
    extract::record::ReleaseRecord,
    foundation::{
        config::CardConfig,
        core::{PanelRect, Point, Rect, Rgba8},
        error::CardResult,
    },
    layout::{
        plan::{CardPlan, DrawOp, ImageFilter},
        shrink::fit_one_line,
    },
    text::engine::{TextBlock, TextEngine},
};

const PANEL_STROKE_PX: f64 = 2.0;
const FRAME_STROKE_PX: f64 = 2.0;

/// Lay out one card.
///
/// Panel heights follow the content (wrap-content). When the content is taller than
/// `config.max_height` the whole composition is downscaled uniformly instead of clipped.
#[tracing::instrument(skip_all, fields(title = %record.title))]
pub fn compose_plan(
    record: &ReleaseRecord,
    assets: &CardAssets,
    config: &CardConfig,
    engine: &mut TextEngine,
) -> CardResult<CardPlan> {
    config.validate()?;
    let g = config.geometry();
    let fonts = &config.fonts;
    let sp = &config.spacing;
    let pal = &config.palette;
    let top = f64::from(config.pad + config.inner_pad_top);
    let mut ops = Vec::new();

    // Left column: date, title, cover.
    let lx = g.left_x + f64::from(config.inner_pad_x);
    let left_text_w = g.left_text_w as f32;
    let mut ly = top;

    let date_text = format!("{}{}", config.date_label, record.date_label());
    let date = engine.wrap(&date_text, fonts.date_px, left_text_w, None);
    ly = push_text(&mut ops, date, lx, ly, sp.date_line_gap, pal.date);

    let title = engine.wrap(&record.title, fonts.title_px, left_text_w, None);
    ly = push_text(&mut ops, title, lx, ly, sp.title_line_gap, pal.title);

    ly += f64::from(sp.before_cover);
    let cover_box = Rect::new(lx, ly, lx + g.cover_side, ly + g.cover_side);
    match &assets.cover {
        Cover::Image(img) => ops.push(DrawOp::Image {
            rect: contain_rect(cover_box, img.width(), img.height()),
            image: img.clone(),
            filter: ImageFilter::Smooth,
        }),
        Cover::Placeholder => ops.push(DrawOp::Fill {
            rect: cover_box,
            color: pal.placeholder,
        }),
    }
    ops.push(DrawOp::Outline {
        rect: cover_box,
        color: pal.frame,
        width: FRAME_STROKE_PX,
    });
    let left_bottom = cover_box.y1;

    // Right column: artist, tracklist, QR, URL.
    let rx = g.right_x + f64::from(config.inner_pad_x);
    let right_text_w = g.right_text_w as f32;
    let mut ry = top;

    if let Some(artist) = record.artist_line.as_deref().filter(|a| !a.is_empty()) {
        let block = engine.single_line_ellipsized(artist, fonts.small_px, right_text_w);
        ry = push_text(&mut ops, block, rx, ry, sp.small_line_gap, pal.artist);
        ry += f64::from(sp.after_artist);
    }

    if !record.tracks.is_empty() {
        let header = engine.single_line_ellipsized(
            &config.tracklist_header,
            fonts.body_px,
            right_text_w,
        );
        push_text(&mut ops, header, rx, ry, 0.0, pal.header);
        ry += f64::from(fonts.body_px + sp.after_header);

        let staff_w = right_text_w - config.staff_indent;
        for track in &record.tracks {
            let main = engine.single_line_ellipsized(&track.label(), fonts.body_px, right_text_w);
            ry = push_text(&mut ops, main, rx, ry, sp.body_line_gap, pal.track);

            if let Some(staff) = track.staff_line.as_deref().filter(|s| !s.is_empty()) {
                let block = engine.wrap(
                    staff,
                    fonts.staff_px,
                    staff_w,
                    Some(config.staff_max_lines),
                );
                let sx = rx + f64::from(config.staff_indent);
                ry = push_text(&mut ops, block, sx, ry, sp.staff_line_gap, pal.staff);
            }
            ry += f64::from(sp.after_track);
        }
    }

    let qr_side = f64::from(config.qr_size);
    let qr_y = ry + f64::from(sp.before_qr);
    let qr_rect = Rect::new(rx, qr_y, rx + qr_side, qr_y + qr_side);
    ops.push(DrawOp::Image {
        image: assets.qr.clone(),
        rect: qr_rect,
        filter: ImageFilter::Crisp,
    });
    ops.push(DrawOp::Outline {
        rect: qr_rect,
        color: pal.frame,
        width: FRAME_STROKE_PX,
    });

    let url_y = qr_rect.y1 + f64::from(sp.before_url);
    let fitted = fit_one_line(engine, &record.source_url, right_text_w, &config.url_font);
    if fitted.overflows {
        tracing::debug!(
            size_px = fitted.size_px,
            width = fitted.width,
            "url caption overflows at the floor size"
        );
    }
    let url = engine.single_line(&record.source_url, fitted.size_px);
    push_text(&mut ops, url, rx, url_y, 0.0, pal.url);
    let right_bottom = url_y + f64::from(fitted.size_px);

    // Wrap-content height.
    let content_bottom = left_bottom.max(right_bottom);
    let natural = (content_bottom + f64::from(config.inner_pad_bottom + config.pad)).ceil();
    let natural_height = (natural as u32).max(1);

    let pad = f64::from(config.pad);
    let frame_bottom = f64::from(natural_height) - pad;
    let radius = f64::from(config.panel_radius);
    let panels = [
        Rect::new(g.left_x, pad, g.left_x + g.left_w, frame_bottom),
        Rect::new(g.right_x, pad, g.right_x + g.right_w, frame_bottom),
    ]
    .map(|rect| DrawOp::Panel {
        rect,
        radius,
        fill: pal.panel_fill,
        stroke: pal.panel_stroke,
        stroke_width: PANEL_STROKE_PX,
    });
    let mut ordered: Vec<DrawOp> = panels.into_iter().collect();
    ordered.extend(ops);

    let (scale, width, height) = if natural_height > config.max_height {
        let scale = f64::from(config.max_height) / f64::from(natural_height);
        let width = (f64::from(config.width) * scale).round().max(1.0) as u32;
        (scale, width, config.max_height)
    } else {
        (1.0, config.width, natural_height)
    };
    if scale < 1.0 {
        tracing::debug!(natural_height, scale, "downscaling card to max height");
    }

    let split = ((g.split * scale).round().max(0.0) as u32).min(width);
    let left_panel = PanelRect {
        x: 0,
        y: 0,
        width: split,
        height,
    };
    let right_panel = PanelRect {
        x: split,
        y: 0,
        width: width - split,
        height,
    };

    Ok(CardPlan {
        natural_width: config.width,
        natural_height,
        scale,
        width,
        height,
        left_panel,
        right_panel,
        background: pal.background,
        ops: ordered,
        url_font_px: fitted.size_px,
        url_overflows: fitted.overflows,
    })
}

/// Push a text op at `(x, y)` and return the y just below the block.
fn push_text(
    ops: &mut Vec<DrawOp>,
    block: TextBlock,
    x: f64,
    y: f64,
    line_gap: f32,
    color: Rgba8,
) -> f64 {
    let bottom = y + f64::from(block.height(line_gap));
    if !block.is_empty() {
        ops.push(DrawOp::Text {
            block,
            origin: Point::new(x, y),
            line_gap,
            color,
        });
    }
    bottom
}

/// Largest rect with the image's aspect ratio that fits `bounds`, centered in it.
pub fn contain_rect(bounds: Rect, img_w: u32, img_h: u32) -> Rect {
    if img_w == 0 || img_h == 0 {
        return bounds;
    }
    let (iw, ih) = (f64::from(img_w), f64::from(img_h));
    let k = (bounds.width() / iw).min(bounds.height() / ih);
    let (w, h) = (iw * k, ih * k);
    let x0 = bounds.x0 + (bounds.width() - w) * 0.5;
    let y0 = bounds.y0 + (bounds.height() - h) * 0.5;
    Rect::new(x0, y0, x0 + w, y0 + h)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/solver.rs"]
mod tests;
