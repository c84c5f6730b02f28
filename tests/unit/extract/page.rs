use super::*;

const PAGE: &str = r#"<!doctype html>
<html><head>
<title>ignored</title>
<style>.x { color: red }</style>
<script>var track = "01：not a track";</script>
</head><body>
<h2>THE IDOLM@STER <span>MASTER ARTIST</span> 01</h2>
<div class="release_img"><img src="/img/cover.jpg"></div>
<p>発売日：2024/3/6</p>
<p>01：Song A<br>作詞：X 作曲：Y</p>
</body></html>"#;

#[test]
fn html_heading_joins_nested_text() {
    let page = PageText::from_html(PAGE);
    assert_eq!(
        page.heading.as_deref(),
        Some("THE IDOLM@STER MASTER ARTIST 01")
    );
}

#[test]
fn html_cover_reference_is_raw() {
    let page = PageText::from_html(PAGE);
    assert_eq!(page.cover_src.as_deref(), Some("/img/cover.jpg"));
}

#[test]
fn html_lines_skip_script_and_style() {
    let page = PageText::from_html(PAGE);
    assert!(page.lines.iter().all(|l| !l.contains("not a track")));
    assert!(page.lines.iter().all(|l| !l.contains("color: red")));
    assert!(page.lines.contains(&"01：Song A".to_string()));
    assert!(page.lines.contains(&"作詞：X 作曲：Y".to_string()));
}

#[test]
fn plain_text_drops_blank_lines() {
    let page = PageText::from_plain("  a \n\n\t\nb\n");
    assert_eq!(page.lines, vec!["a".to_string(), "b".to_string()]);
    assert!(page.heading.is_none());
}

#[test]
fn og_image_is_a_cover_fallback() {
    let page = PageText::from_html(
        r#"<html><head><meta property="og:image" content="https://x/c.png"></head><body><h1>T</h1></body></html>"#,
    );
    assert_eq!(page.cover_src.as_deref(), Some("https://x/c.png"));
    assert_eq!(page.heading.as_deref(), Some("T"));
}
