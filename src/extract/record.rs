use chrono::NaiveDate;

use crate::foundation::error::AssetError;

/// The pair of links a schedule item can carry.
///
/// Display policy: the event URL wins whenever it is present; the generic page URL is only
/// used when there is no event URL. Exactly one of them is ever shown or encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReleaseLink {
    /// Release-specific detail page, if the schedule item has one.
    pub event_url: Option<String>,
    /// Generic listing page for the item.
    pub page_url: String,
}

impl ReleaseLink {
    /// Build a link pair. Blank event URLs are treated as absent.
    pub fn new(event_url: Option<String>, page_url: impl Into<String>) -> Self {
        let event_url = event_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Self {
            event_url,
            page_url: page_url.into().trim().to_string(),
        }
    }

    /// Link pair for a page that is its own event URL.
    pub fn event(url: impl Into<String>) -> Self {
        Self::new(Some(url.into()), String::new())
    }

    /// The single URL to print and encode.
    pub fn display_url(&self) -> Result<&str, AssetError> {
        match self.event_url.as_deref() {
            Some(u) if !u.trim().is_empty() => Ok(u.trim()),
            _ if !self.page_url.trim().is_empty() => Ok(self.page_url.trim()),
            _ => Err(AssetError::UnresolvableUrl),
        }
    }
}

/// One track line with its optional staff credit.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrackEntry {
    /// Track number as printed on the page, when the line carries one.
    pub number: Option<u32>,
    pub title: String,
    /// Credit line attached positionally; `None` is an empty staff field.
    pub staff_line: Option<String>,
}

impl TrackEntry {
    /// Title as rendered: zero-padded number followed by the title.
    pub fn label(&self) -> String {
        match self.number {
            Some(n) => format!("{n:02} {}", self.title),
            None => self.title.clone(),
        }
    }
}

/// One CD release, as extracted from its detail page.
///
/// Immutable once built; the cover bitmap is resolved separately.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReleaseRecord {
    pub date: NaiveDate,
    pub title: String,
    /// First performer-credit line (`CV.` / `アーティスト`).
    pub artist_line: Option<String>,
    /// Performer-credit lines after the first. Never rendered.
    pub extra_artist_lines: Vec<String>,
    /// Tracks in source order.
    pub tracks: Vec<TrackEntry>,
    /// The single URL shown in the caption and encoded in the QR code.
    pub source_url: String,
    /// Absolute cover image URL, when the page references one.
    pub cover_ref: Option<String>,
}

impl ReleaseRecord {
    /// Release date formatted as `YYYY/M/D`.
    pub fn date_label(&self) -> String {
        self.date.format("%Y/%-m/%-d").to_string()
    }

    /// Short identification used in logs and batch reports.
    pub fn describe(&self) -> String {
        format!("{} {}", self.date_label(), self.title)
    }
}
