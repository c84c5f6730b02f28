use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

/// Longest file stem produced by [`safe_name`].
pub const SAFE_NAME_MAX_LEN: usize = 80;

/// Supplies fetched page markup keyed by URL. The HTTP fetch itself lives elsewhere.
pub trait PageSource: Send + Sync {
    /// Markup of the page at `url`.
    fn page_markup(&self, url: &str) -> anyhow::Result<String>;
}

/// Supplies encoded cover image bytes keyed by the cover reference URL.
pub trait CoverSource: Send + Sync {
    /// Encoded image bytes behind `url`.
    fn cover_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

/// Map a URL to a filesystem-safe name: anything outside `[A-Za-z0-9._-]` becomes `_`,
/// runs collapse, and the result is cut to [`SAFE_NAME_MAX_LEN`] characters.
pub fn safe_name(url: &str) -> String {
    let mut out = String::with_capacity(url.len().min(SAFE_NAME_MAX_LEN));
    let mut last_sub = false;
    for c in url.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            last_sub = false;
        } else if !last_sub {
            out.push('_');
            last_sub = true;
        }
    }
    out.chars().take(SAFE_NAME_MAX_LEN).collect()
}

/// A local mirror of fetched pages and covers.
///
/// Pages live at `<root>/<safe_name(url)>.html`, covers at `<root>/<safe_name(url)>`.
#[derive(Clone, Debug)]
pub struct MirrorDir {
    root: PathBuf,
}

impl MirrorDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the page for `url` is expected.
    pub fn page_path(&self, url: &str) -> PathBuf {
        self.root.join(format!("{}.html", safe_name(url)))
    }

    /// Where the cover for `url` is expected.
    pub fn cover_path(&self, url: &str) -> PathBuf {
        self.root.join(safe_name(url))
    }
}

impl PageSource for MirrorDir {
    fn page_markup(&self, url: &str) -> anyhow::Result<String> {
        let path = self.page_path(url);
        std::fs::read_to_string(&path)
            .with_context(|| format!("read mirrored page '{}'", path.display()))
    }
}

impl CoverSource for MirrorDir {
    fn cover_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.cover_path(url);
        std::fs::read(&path).with_context(|| format!("read mirrored cover '{}'", path.display()))
    }
}

/// A single cover file used regardless of the page's cover reference.
#[derive(Clone, Debug)]
pub struct CoverFile(pub PathBuf);

impl CoverSource for CoverFile {
    fn cover_bytes(&self, _url: &str) -> anyhow::Result<Vec<u8>> {
        std::fs::read(&self.0).with_context(|| format!("read cover '{}'", self.0.display()))
    }
}

/// A cover source with nothing in it; every card gets the placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCovers;

impl CoverSource for NoCovers {
    fn cover_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        bail!("no cover source configured for '{url}'")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
