use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

// Numbered listings: "01：Title", "1．Title", "12: Title", "M3. Title", "Track 4 Title".
static TRACK_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?:(?i:track|m)\.?\s*)?(?P<no>\d{1,2})\s*[：:.．]\s*(?P<title>\S.*)$").ok()
});
static TRACK_WORD_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?i:track)\.?\s*(?P<no>\d{1,2})(?:\s+(?P<title>\S.*))?$").ok()
});
static STAFF_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"作詞|作曲|編曲|(?i:\b(?:lyrics|music|arrange(?:d|ment)?)\b\s*(?:by\b|[:：]))").ok()
});
static ARTIST_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"CV\.|^アーティスト|^(?i:artist)\s*[:：]").ok());
static DATE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?P<y>\d{4})\s*[./\-年]\s*(?P<m>\d{1,2})\s*[./\-月]\s*(?P<d>\d{1,2})").ok()
});
static NOISE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^(?:text|-->|■)").ok());

const DATE_LABEL: &str = "発売日";

/// Classification of one text line. Each line gets exactly one token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineToken {
    /// Opens a new track entry.
    Track {
        number: Option<u32>,
        title: String,
    },
    /// Lyricist / composer / arranger credit. `artist` is set when the line also carries a
    /// performer-credit marker, so an unattached credit can still serve as the artist line.
    Staff { line: String, artist: bool },
    /// Performer credit.
    Artist(String),
    /// A line carrying a calendar date; `labeled` when it is the release-date field.
    Date { date: NaiveDate, labeled: bool },
    /// Markup leftovers that never affect positional attachment.
    Noise,
    /// Anything else: promotion, catalog numbers, prices.
    Other(String),
}

/// Classify one trimmed line. Precedence: track, staff, artist, date, noise, other.
pub fn classify_line(line: &str) -> LineToken {
    if let Some(token) = track_token(line) {
        return token;
    }
    if matches(&STAFF_RE, line) {
        return LineToken::Staff {
            line: line.to_string(),
            artist: matches(&ARTIST_RE, line),
        };
    }
    if matches(&ARTIST_RE, line) {
        return LineToken::Artist(line.to_string());
    }
    if let Some(date) = find_date(line) {
        return LineToken::Date {
            date,
            labeled: line.starts_with(DATE_LABEL),
        };
    }
    if matches(&NOISE_RE, line) {
        return LineToken::Noise;
    }
    LineToken::Other(line.to_string())
}

/// First valid calendar date anywhere in `text`.
pub fn find_date(text: &str) -> Option<NaiveDate> {
    let re = DATE_RE.as_ref()?;
    re.captures_iter(text).find_map(|caps| {
        let y = caps.name("y")?.as_str().parse::<i32>().ok()?;
        let m = caps.name("m")?.as_str().parse::<u32>().ok()?;
        let d = caps.name("d")?.as_str().parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(y, m, d)
    })
}

fn track_token(line: &str) -> Option<LineToken> {
    if let Some(caps) = TRACK_RE.as_ref().and_then(|re| re.captures(line)) {
        let number = caps.name("no").and_then(|m| m.as_str().parse::<u32>().ok());
        let title = caps.name("title").map(|m| m.as_str().trim()).unwrap_or("");
        return Some(LineToken::Track {
            number,
            title: title.to_string(),
        });
    }
    let caps = TRACK_WORD_RE.as_ref()?.captures(line)?;
    match caps.name("title").map(|m| m.as_str().trim()) {
        Some(title) if !title.is_empty() => Some(LineToken::Track {
            number: caps.name("no").and_then(|m| m.as_str().parse::<u32>().ok()),
            title: title.to_string(),
        }),
        // "Track 2" alone: the whole line is the display title.
        _ => Some(LineToken::Track {
            number: None,
            title: line.to_string(),
        }),
    }
}

fn matches(re: &LazyLock<Option<Regex>>, line: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(line))
}

#[cfg(test)]
#[path = "../../tests/unit/extract/classify.rs"]
mod tests;
