use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::{
    extract::record::ReleaseLink,
    foundation::error::{CardError, CardResult},
};

/// Hosts whose links are miscategorized videos rather than release pages.
const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// Default display offset (JST), in seconds east of UTC.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 9 * 3600;

#[derive(Deserialize, Debug, Default)]
struct ScheduleDump {
    #[serde(default)]
    article_list: Vec<ScheduleItem>,
}

#[derive(Deserialize, Debug, Default)]
struct ScheduleItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    event_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    event_startdate: Option<i64>,
    #[serde(default, deserialize_with = "de_timestamp")]
    startdate: Option<i64>,
    #[serde(default, deserialize_with = "de_timestamp")]
    event_enddate: Option<i64>,
    #[serde(default, deserialize_with = "de_timestamp")]
    enddate: Option<i64>,
    #[serde(default)]
    brand: Vec<serde_json::Value>,
}

/// Timestamps arrive as numbers, numeric strings, empty strings or null.
fn de_timestamp<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match v {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .filter(|ts| *ts != 0))
}

/// One schedule row of the portal.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ScheduleEntry {
    /// Unix seconds; 0 when the item carries no start.
    pub start: i64,
    pub end: Option<i64>,
    pub title: String,
    pub brands: Vec<String>,
    pub event_url: Option<String>,
    pub portal_url: Option<String>,
}

impl ScheduleEntry {
    /// Event URL when present, else the portal URL.
    pub fn link(&self) -> ReleaseLink {
        ReleaseLink::new(
            self.event_url.clone(),
            self.portal_url.clone().unwrap_or_default(),
        )
    }
}

/// Parse a schedule dump (`{"article_list": [...]}`) into entries sorted by start time.
pub fn parse_schedule(json: &str) -> CardResult<Vec<ScheduleEntry>> {
    let dump: ScheduleDump =
        serde_json::from_str(json).map_err(|e| CardError::serde(e.to_string()))?;

    let mut entries: Vec<ScheduleEntry> = dump
        .article_list
        .into_iter()
        .map(|a| ScheduleEntry {
            start: a.event_startdate.or(a.startdate).unwrap_or(0),
            end: a.event_enddate.or(a.enddate),
            title: a.title.unwrap_or_default().trim().to_string(),
            brands: a
                .brand
                .iter()
                .filter_map(|b| b.get("code"))
                .filter_map(|c| match c {
                    serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            event_url: non_blank(a.event_url),
            portal_url: non_blank(a.url),
        })
        .collect();
    entries.sort_by_key(|e| e.start);
    tracing::debug!(entries = entries.len(), "parsed schedule");
    Ok(entries)
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Whether `url` points at a video host.
pub fn is_video_url(url: &str) -> bool {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| VIDEO_HOSTS.iter().any(|v| host.contains(v)))
}

/// Links worth rendering as cards: entries with an event URL that is not a video,
/// in start order, each URL once.
pub fn batch_links(entries: &[ScheduleEntry]) -> Vec<ReleaseLink> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for entry in entries {
        let Some(event_url) = entry.event_url.as_deref() else {
            continue;
        };
        if is_video_url(event_url) {
            tracing::debug!(url = event_url, "dropping video link");
            continue;
        }
        if !seen.insert(event_url.to_string()) {
            continue;
        }
        out.push(entry.link());
    }
    out
}

/// Text listing: `- <start> ~ <end> | <title> (<brands>)` then the URL, one pair per entry.
///
/// Entries without a start time are left out.
pub fn render_listing(entries: &[ScheduleEntry], offset: FixedOffset) -> String {
    let mut out = Vec::new();
    for entry in entries.iter().filter(|e| e.start != 0) {
        let start = format_ts(entry.start, offset);
        let when = match entry.end.map(|e| format_ts(e, offset)) {
            Some(end) if !end.is_empty() => format!("{start} ~ {end}"),
            _ => start,
        };
        let brands = if entry.brands.is_empty() {
            String::new()
        } else {
            format!(" ({})", entry.brands.join(","))
        };
        let url = entry.link().display_url().unwrap_or("").to_string();
        out.push(format!("- {when} | {}{brands}", entry.title));
        out.push(format!("  {url}"));
    }
    out.join("\n")
}

fn format_ts(ts: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/portal.rs"]
mod tests;
