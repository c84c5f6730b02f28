use std::sync::Arc;

use super::*;
use crate::foundation::core::PanelRect;

fn plan(width: u32, height: u32, ops: Vec<DrawOp>) -> CardPlan {
    CardPlan {
        natural_width: width,
        natural_height: height,
        scale: 1.0,
        width,
        height,
        left_panel: PanelRect {
            x: 0,
            y: 0,
            width: width / 2,
            height,
        },
        right_panel: PanelRect {
            x: width / 2,
            y: 0,
            width: width - width / 2,
            height,
        },
        background: [250, 250, 250, 255],
        ops,
        url_font_px: 20.0,
        url_overflows: false,
    }
}

#[test]
fn background_fills_the_canvas() {
    let img = rasterize(&plan(40, 30, Vec::new())).unwrap();
    assert_eq!(img.dimensions(), (40, 30));
    assert_eq!(img.get_pixel(0, 0).0, [250, 250, 250, 255]);
    assert_eq!(img.get_pixel(39, 29).0, [250, 250, 250, 255]);
}

#[test]
fn fill_op_paints_its_rect() {
    let ops = vec![DrawOp::Fill {
        rect: Rect::new(10.0, 10.0, 20.0, 20.0),
        color: [0, 0, 255, 255],
    }];
    let img = rasterize(&plan(40, 30, ops)).unwrap();
    assert_eq!(img.get_pixel(15, 15).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(5, 5).0, [250, 250, 250, 255]);
}

#[test]
fn crisp_image_is_blitted_pixel_exact() {
    let mut src = RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 255]));
    src.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
    let ops = vec![DrawOp::Image {
        image: Arc::new(src),
        rect: Rect::new(8.0, 8.0, 16.0, 16.0),
        filter: ImageFilter::Crisp,
    }];
    let img = rasterize(&plan(32, 32, ops)).unwrap();
    assert_eq!(img.get_pixel(8, 8).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(9, 9).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(12, 12).0, [255, 255, 255, 255]);
}

#[test]
fn downscaled_plan_renders_at_final_size() {
    let mut p = plan(60, 40, Vec::new());
    p.natural_height = 80;
    p.scale = 0.5;
    let img = rasterize(&p).unwrap();
    assert_eq!(img.dimensions(), (60, 40));
}

#[test]
fn oversized_canvas_is_a_layout_error() {
    let p = plan(70_000, 10, Vec::new());
    assert!(matches!(
        rasterize(&p),
        Err(CardError::Layout(LayoutError::CanvasTooLarge { .. }))
    ));
}
