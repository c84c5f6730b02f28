use chrono::NaiveDate;

use crate::{
    extract::{
        classify::{LineToken, classify_line},
        page::PageText,
        record::{ReleaseLink, ReleaseRecord, TrackEntry},
    },
    foundation::error::ExtractionError,
};

/// Separator used when a credit block spans several consecutive lines.
const STAFF_JOIN: &str = " / ";

/// Series name that marks a title line on heading-less pages.
const SERIES_MARK: &str = "THE IDOLM@STER";
/// Banner lines that carry the series name but are not titles.
const RELEASE_BANNER: &str = "RELEASE";

/// Attachment state of the line scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// No open track; credit lines here are orphans.
    Scanning,
    /// The previous line opened a track; a credit line attaches to it.
    AfterTrack,
    /// The open track already has a staff line; further credit lines extend it.
    InStaff,
}

/// Folds classified lines into release fields.
///
/// Staff attachment is positional only: a credit line attaches to the track opened on the
/// immediately preceding (non-noise) line, never by name.
#[derive(Debug)]
pub struct LineScanner {
    state: ScanState,
    tracks: Vec<TrackEntry>,
    artist_line: Option<String>,
    extra_artist_lines: Vec<String>,
    labeled_date: Option<NaiveDate>,
    first_date: Option<NaiveDate>,
    title_line: Option<String>,
    series_title: Option<String>,
}

impl Default for LineScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LineScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Scanning,
            tracks: Vec::new(),
            artist_line: None,
            extra_artist_lines: Vec::new(),
            labeled_date: None,
            first_date: None,
            title_line: None,
            series_title: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn tracks(&self) -> &[TrackEntry] {
        &self.tracks
    }

    /// Consume one token and advance the state machine.
    pub fn feed(&mut self, token: LineToken) {
        self.state = match (self.state, token) {
            (_, LineToken::Track { number, title }) => {
                self.tracks.push(TrackEntry {
                    number,
                    title,
                    staff_line: None,
                });
                ScanState::AfterTrack
            }
            (ScanState::AfterTrack, LineToken::Staff { line, .. }) => {
                if let Some(open) = self.tracks.last_mut() {
                    open.staff_line = Some(line);
                }
                ScanState::InStaff
            }
            (ScanState::InStaff, LineToken::Staff { line, .. }) => {
                if let Some(staff) = self.tracks.last_mut().and_then(|t| t.staff_line.as_mut()) {
                    staff.push_str(STAFF_JOIN);
                    staff.push_str(&line);
                }
                ScanState::InStaff
            }
            // No track consumed it; a credit line with a performer marker still counts.
            (ScanState::Scanning, LineToken::Staff { line, artist }) => {
                if artist {
                    self.push_artist(line);
                }
                ScanState::Scanning
            }
            (_, LineToken::Artist(line)) => {
                self.push_artist(line);
                ScanState::Scanning
            }
            (_, LineToken::Date { date, labeled }) => {
                if labeled && self.labeled_date.is_none() {
                    self.labeled_date = Some(date);
                }
                if self.first_date.is_none() {
                    self.first_date = Some(date);
                }
                ScanState::Scanning
            }
            (state, LineToken::Noise) => state,
            (_, LineToken::Other(line)) => {
                if self.series_title.is_none()
                    && line.contains(SERIES_MARK)
                    && !line.contains(RELEASE_BANNER)
                {
                    self.series_title = Some(line.clone());
                }
                if self.title_line.is_none() && self.tracks.is_empty() {
                    self.title_line = Some(line);
                }
                ScanState::Scanning
            }
        };
    }

    fn push_artist(&mut self, line: String) {
        if self.artist_line.is_none() {
            self.artist_line = Some(line);
        } else {
            self.extra_artist_lines.push(line);
        }
    }

    /// Finish scanning. Title priority: `heading`, then a line naming the series, then the first
/// free-standing line before any track.
    pub fn finish(
        self,
        heading: Option<&str>,
        source_url: String,
        cover_ref: Option<String>,
    ) -> Result<ReleaseRecord, ExtractionError> {
        let date = self
            .labeled_date
            .or(self.first_date)
            .ok_or(ExtractionError::MissingDate)?;
        let title = heading
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .or(self.series_title)
            .or(self.title_line)
            .ok_or(ExtractionError::MissingTitle)?;

        Ok(ReleaseRecord {
            date,
            title,
            artist_line: self.artist_line,
            extra_artist_lines: self.extra_artist_lines,
            tracks: self.tracks,
            source_url,
            cover_ref,
        })
    }
}

/// Extract a [`ReleaseRecord`] from page text.
///
/// Pure: identical inputs always produce identical records.
#[tracing::instrument(skip_all, fields(url = link.display_url().unwrap_or("")))]
pub fn extract_release(
    page: &PageText,
    link: &ReleaseLink,
) -> Result<ReleaseRecord, ExtractionError> {
    if page.lines.is_empty() && page.heading.is_none() {
        return Err(ExtractionError::Unparseable("page has no text".into()));
    }

    let mut scanner = LineScanner::new();
    for line in &page.lines {
        scanner.feed(classify_line(line));
    }

    if !scanner.extra_artist_lines.is_empty() {
        tracing::warn!(
            kept = scanner.artist_line.as_deref().unwrap_or(""),
            ignored = scanner.extra_artist_lines.len(),
            "multiple performer-credit lines; keeping the first"
        );
    }

    let source_url = link.display_url().unwrap_or("").to_string();
    let cover_ref = page
        .cover_src
        .as_deref()
        .and_then(|src| resolve_reference(&source_url, src));

    let record = scanner.finish(page.heading.as_deref(), source_url, cover_ref)?;
    tracing::debug!(
        title = %record.title,
        tracks = record.tracks.len(),
        "extracted release"
    );
    Ok(record)
}

/// Resolve a possibly relative reference against the page URL.
pub fn resolve_reference(base: &str, reference: &str) -> Option<String> {
    if let Ok(abs) = url::Url::parse(reference) {
        return Some(abs.to_string());
    }
    let base = url::Url::parse(base).ok()?;
    base.join(reference).ok().map(|u| u.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/extract/machine.rs"]
mod tests;
