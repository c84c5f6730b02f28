use std::sync::Arc;

use chrono::NaiveDate;
use image::RgbaImage;

use super::*;
use crate::extract::record::TrackEntry;

fn record(tracks: usize) -> ReleaseRecord {
    ReleaseRecord {
        date: NaiveDate::from_ymd_opt(2024, 1, 17).unwrap(),
        title: "THE IDOLM@STER MASTER ARTIST 5".into(),
        artist_line: Some("天海春香 (CV.中村繪里子)".into()),
        extra_artist_lines: Vec::new(),
        tracks: (1..=tracks as u32)
            .map(|n| TrackEntry {
                number: Some(n),
                title: format!("Song {n}"),
                staff_line: Some("作詞：A / 作曲：B / 編曲：C".into()),
            })
            .collect(),
        source_url: "https://lantis.jp/release-item/LACA-15999.html".into(),
        cover_ref: None,
    }
}

fn assets() -> CardAssets {
    CardAssets {
        cover: Cover::Placeholder,
        qr: Arc::new(RgbaImage::from_pixel(190, 190, image::Rgba([255, 255, 255, 255]))),
        cover_issue: None,
    }
}

fn plan(rec: &ReleaseRecord) -> CardPlan {
    let mut engine = TextEngine::metrics_only();
    compose_plan(rec, &assets(), &CardConfig::default(), &mut engine).unwrap()
}

fn text_ops(plan: &CardPlan) -> Vec<&TextBlock> {
    plan.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { block, .. } => Some(block),
            _ => None,
        })
        .collect()
}

#[test]
fn panels_span_full_height_and_tile_the_width() {
    let p = plan(&record(3));
    assert_eq!(p.scale, 1.0);
    assert_eq!(p.left_panel.height, p.height);
    assert_eq!(p.right_panel.height, p.height);
    assert_eq!(p.left_panel.x, 0);
    assert_eq!(p.left_panel.width, 475);
    assert_eq!(p.right_panel.x, p.left_panel.right());
    assert_eq!(p.right_panel.right(), p.width);
    assert!(!p.left_panel.overlaps(p.right_panel));
}

#[test]
fn short_card_wraps_content() {
    let p = plan(&record(1));
    assert!(p.height < 1500);
    assert_eq!(p.height, p.natural_height);
    assert_eq!(p.width, 1200);
}

#[test]
fn more_tracks_make_a_taller_card() {
    assert!(plan(&record(6)).natural_height > plan(&record(2)).natural_height);
}

#[test]
fn long_tracklist_downscales_uniformly() {
    let p = plan(&record(40));
    assert!(p.natural_height > 1500);
    assert_eq!(p.height, 1500);
    assert!(p.is_downscaled());
    let expected_w = (1200.0 * 1500.0 / f64::from(p.natural_height)).round() as u32;
    assert_eq!(p.width, expected_w);
    assert_eq!(p.left_panel.height, 1500);
    assert_eq!(p.right_panel.height, 1500);
    assert_eq!(p.right_panel.right(), p.width);
}

#[test]
fn zero_tracks_omit_the_header() {
    let p = plan(&record(0));
    assert!(
        text_ops(&p)
            .iter()
            .all(|b| b.lines.iter().all(|l| l.text != "曲目 / Staff"))
    );
}

#[test]
fn header_present_with_tracks() {
    let p = plan(&record(1));
    assert!(
        text_ops(&p)
            .iter()
            .any(|b| b.lines.iter().any(|l| l.text == "曲目 / Staff"))
    );
}

#[test]
fn url_caption_is_one_unbroken_line() {
    let mut rec = record(1);
    rec.source_url = format!("https://lantis.jp/release-item/{}.html", "X".repeat(200));
    let p = plan(&rec);
    assert_eq!(p.url_font_px, 12.0);
    assert!(p.url_overflows);
    let url_block = text_ops(&p)
        .into_iter()
        .find(|b| b.lines.iter().any(|l| l.text.starts_with("https://")))
        .unwrap();
    assert_eq!(url_block.line_count(), 1);
    assert_eq!(url_block.lines[0].text, rec.source_url);
}

#[test]
fn artist_is_a_single_line() {
    let mut rec = record(1);
    rec.artist_line = Some("天海春香 (CV.中村繪里子)、".repeat(10));
    let p = plan(&rec);
    let artist = text_ops(&p)
        .into_iter()
        .find(|b| b.lines.iter().any(|l| l.text.starts_with("天海春香")))
        .unwrap();
    assert_eq!(artist.line_count(), 1);
    assert!(artist.lines[0].text.ends_with('…'));
}

#[test]
fn staff_lines_are_capped() {
    let mut rec = record(1);
    rec.tracks[0].staff_line = Some("作詞：ABCDEFG / ".repeat(30));
    let p = plan(&rec);
    let staff = text_ops(&p)
        .into_iter()
        .find(|b| b.lines.iter().any(|l| l.text.starts_with("作詞")))
        .unwrap();
    assert_eq!(staff.line_count(), 2);
}

#[test]
fn huge_title_never_fails() {
    let mut rec = record(2);
    rec.title = "超".repeat(2000);
    let p = plan(&rec);
    assert_eq!(p.height, 1500);
    assert!(p.scale < 1.0);
}

#[test]
fn invalid_config_is_a_layout_error() {
    let cfg = CardConfig {
        width: 500,
        ..CardConfig::default()
    };
    let mut engine = TextEngine::metrics_only();
    assert!(compose_plan(&record(1), &assets(), &cfg, &mut engine).is_err());
}

#[test]
fn contain_rect_centers_and_keeps_aspect() {
    let r = contain_rect(Rect::new(0.0, 0.0, 390.0, 390.0), 200, 100);
    assert_eq!(r.width(), 390.0);
    assert_eq!(r.height(), 195.0);
    assert_eq!(r.y0, 97.5);
    assert_eq!(r.x0, 0.0);
}
