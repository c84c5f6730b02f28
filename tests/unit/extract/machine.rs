use super::*;

fn plain(lines: &[&str]) -> PageText {
    PageText::from_plain(&lines.join("\n"))
}

fn link() -> ReleaseLink {
    ReleaseLink::event("https://lantis.jp/release-item/LACA-1.html")
}

#[test]
fn staff_attaches_to_immediately_preceding_track_only() {
    let page = plain(&[
        "2024/01/17 RELEASE",
        "Some Title",
        "Track 1",
        "作詞/作曲/編曲: X",
        "Track 2",
    ]);
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(rec.tracks.len(), 2);
    assert_eq!(rec.tracks[0].title, "Track 1");
    assert_eq!(
        rec.tracks[0].staff_line.as_deref(),
        Some("作詞/作曲/編曲: X")
    );
    assert_eq!(rec.tracks[1].staff_line, None);
}

#[test]
fn credit_separated_by_other_line_is_orphaned() {
    let page = plain(&[
        "発売日：2024/1/17",
        "Title",
        "01：A",
        "LACA-15999",
        "作詞：X",
        "02：B",
    ]);
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(rec.tracks[0].staff_line, None);
    assert_eq!(rec.tracks[1].staff_line, None);
}

#[test]
fn multi_line_credit_block_folds_into_one_staff_line() {
    let page = plain(&[
        "発売日：2024/1/17",
        "Title",
        "01：A",
        "作詞：X",
        "作曲：Y",
        "編曲：Z",
        "02：B",
        "作詞：W",
    ]);
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(
        rec.tracks[0].staff_line.as_deref(),
        Some("作詞：X / 作曲：Y / 編曲：Z")
    );
    assert_eq!(rec.tracks[1].staff_line.as_deref(), Some("作詞：W"));
}

#[test]
fn noise_between_track_and_credit_is_transparent() {
    let mut scanner = LineScanner::new();
    scanner.feed(classify_line("01：A"));
    assert_eq!(scanner.state(), ScanState::AfterTrack);
    scanner.feed(classify_line("-->"));
    assert_eq!(scanner.state(), ScanState::AfterTrack);
    scanner.feed(classify_line("作詞：X"));
    assert_eq!(scanner.state(), ScanState::InStaff);
    assert_eq!(scanner.tracks()[0].staff_line.as_deref(), Some("作詞：X"));
}

#[test]
fn credit_lines_are_never_artist_or_track() {
    let page = plain(&[
        "発売日：2024/1/17",
        "Title",
        "01：A",
        "作詞：X (CV.Y)",
        "天海春香 (CV.中村繪里子)",
    ]);
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(rec.tracks.len(), 1);
    assert_eq!(rec.tracks[0].staff_line.as_deref(), Some("作詞：X (CV.Y)"));
    assert_eq!(rec.artist_line.as_deref(), Some("天海春香 (CV.中村繪里子)"));
}

#[test]
fn first_artist_line_wins_and_extras_are_kept_aside() {
    let page = plain(&[
        "2024/1/17",
        "Title",
        "A (CV.a)",
        "B (CV.b)",
        "アーティスト：C",
    ]);
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(rec.artist_line.as_deref(), Some("A (CV.a)"));
    assert_eq!(rec.extra_artist_lines, vec!["B (CV.b)", "アーティスト：C"]);
}

#[test]
fn unattached_credit_with_performer_marker_becomes_artist_line() {
    let page = plain(&[
        "発売日：2024/1/17",
        "Title",
        "天海春香 (CV.中村繪里子) 作曲参加",
        "01：Song",
    ]);
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(
        rec.artist_line.as_deref(),
        Some("天海春香 (CV.中村繪里子) 作曲参加")
    );
    assert_eq!(rec.tracks.len(), 1);
    assert_eq!(rec.tracks[0].staff_line, None);
}

#[test]
fn series_line_beats_navigation_text_as_title() {
    let page = plain(&[
        "HOME",
        "THE IDOLM@STER NEW RELEASE",
        "発売日：2024/1/17",
        "THE IDOLM@STER MASTER ARTIST 5 01 天海春香",
        "01：Song",
    ]);
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(rec.title, "THE IDOLM@STER MASTER ARTIST 5 01 天海春香");
}

#[test]
fn labeled_date_beats_earlier_unlabeled_date() {
    let page = plain(&["2023/12/01 NEWS", "Title", "発売日：2024/1/17"]);
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
}

#[test]
fn missing_date_is_an_error() {
    let page = plain(&["Title", "01：A"]);
    assert_eq!(
        extract_release(&page, &link()),
        Err(ExtractionError::MissingDate)
    );
}

#[test]
fn missing_title_is_an_error() {
    let page = plain(&["2024/1/17", "01：A"]);
    assert_eq!(
        extract_release(&page, &link()),
        Err(ExtractionError::MissingTitle)
    );
}

#[test]
fn empty_page_is_unparseable() {
    assert!(matches!(
        extract_release(&PageText::default(), &link()),
        Err(ExtractionError::Unparseable(_))
    ));
}

#[test]
fn zero_tracks_is_legal() {
    let page = plain(&["2024/1/17", "Title", "¥1,650"]);
    let rec = extract_release(&page, &link()).unwrap();
    assert!(rec.tracks.is_empty());
}

#[test]
fn heading_wins_over_title_line() {
    let page = PageText {
        heading: Some("Heading Title".into()),
        ..plain(&["2024/1/17", "Free line"])
    };
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(rec.title, "Heading Title");
}

#[test]
fn extraction_is_deterministic() {
    let html = r#"<html><body><h2>T</h2><div class="release_img"><img src="c.jpg"></div>
        <p>発売日：2024/1/17</p><p>A (CV.a)</p><p>01：X</p><p>作詞：Y</p><p>02：Z</p></body></html>"#;
    let a = extract_release(&PageText::from_html(html), &link()).unwrap();
    let b = extract_release(&PageText::from_html(html), &link()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn event_url_is_the_only_source_url() {
    let link = ReleaseLink::new(
        Some("https://event.example/cd/1".into()),
        "https://portal.example/schedule",
    );
    let rec = extract_release(&plain(&["2024/1/17", "T"]), &link).unwrap();
    assert_eq!(rec.source_url, "https://event.example/cd/1");
    assert_ne!(rec.source_url, link.page_url);
}

#[test]
fn relative_cover_is_resolved_against_page_url() {
    let page = PageText {
        cover_src: Some("../img/c.jpg".into()),
        ..plain(&["2024/1/17", "T"])
    };
    let rec = extract_release(&page, &link()).unwrap();
    assert_eq!(rec.cover_ref.as_deref(), Some("https://lantis.jp/img/c.jpg"));
}
