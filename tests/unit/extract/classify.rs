use super::*;

fn track(number: Option<u32>, title: &str) -> LineToken {
    LineToken::Track {
        number,
        title: title.to_string(),
    }
}

#[test]
fn numbered_track_formats() {
    assert_eq!(classify_line("01：Happy!"), track(Some(1), "Happy!"));
    assert_eq!(classify_line("1．きらめき"), track(Some(1), "きらめき"));
    assert_eq!(classify_line("12: Title"), track(Some(12), "Title"));
    assert_eq!(classify_line("M3. Title"), track(Some(3), "Title"));
    assert_eq!(classify_line("Track 4 Title"), track(Some(4), "Title"));
    assert_eq!(classify_line("Track 1"), track(None, "Track 1"));
}

#[test]
fn release_lines_are_not_tracks() {
    assert!(matches!(
        classify_line("2024.3.6 RELEASE"),
        LineToken::Date { labeled: false, .. }
    ));
    assert!(matches!(classify_line("LACA-15999"), LineToken::Other(_)));
    assert!(matches!(classify_line("¥1,650(税込)"), LineToken::Other(_)));
}

#[test]
fn staff_tokens() {
    for line in [
        "作詞：A 作曲：B 編曲：C",
        "作詞/作曲/編曲: X",
        "編曲：D",
        "Lyrics: A",
        "Music by B",
    ] {
        assert_eq!(
            classify_line(line),
            LineToken::Staff {
                line: line.to_string(),
                artist: false
            },
            "{line}"
        );
    }
    assert!(matches!(classify_line("Music Video 収録"), LineToken::Other(_)));
}

#[test]
fn credit_with_performer_marker_is_flagged() {
    let line = "天海春香 (CV.中村繪里子) 作曲参加";
    assert_eq!(
        classify_line(line),
        LineToken::Staff {
            line: line.to_string(),
            artist: true
        }
    );
}

#[test]
fn artist_tokens() {
    for line in ["天海春香 (CV.中村繪里子)", "アーティスト：シャイニーカラーズ", "Artist: X"] {
        assert_eq!(classify_line(line), LineToken::Artist(line.to_string()), "{line}");
    }
}

#[test]
fn labeled_and_unlabeled_dates() {
    let d = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
    assert_eq!(
        classify_line("発売日：2024/3/6"),
        LineToken::Date {
            date: d,
            labeled: true
        }
    );
    assert_eq!(
        classify_line("2024年03月06日発売"),
        LineToken::Date {
            date: d,
            labeled: false
        }
    );
}

#[test]
fn impossible_dates_are_ignored() {
    assert_eq!(find_date("2024/13/40"), None);
    assert_eq!(
        find_date("old 2024/13/40 then 2023-02-28"),
        NaiveDate::from_ymd_opt(2023, 2, 28)
    );
}

#[test]
fn noise_markers() {
    assert_eq!(classify_line("-->"), LineToken::Noise);
    assert_eq!(classify_line("■ 収録内容"), LineToken::Noise);
    assert_eq!(classify_line("text/javascript"), LineToken::Noise);
}
