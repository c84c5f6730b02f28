use std::sync::Arc;

use image::RgbaImage;

use crate::{
    assets::{
        decode::decode_cover,
        qr::QrEncoder,
        source::{CoverSource, PageSource},
    },
    extract::record::ReleaseRecord,
    foundation::error::AssetError,
};

/// Cover slot content for one card.
#[derive(Clone, Debug)]
pub enum Cover {
    /// A decoded cover bitmap, straight alpha.
    Image(Arc<RgbaImage>),
    /// Neutral placeholder drawn when the cover is unavailable.
    Placeholder,
}

impl Cover {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// Bitmaps needed to draw one card.
#[derive(Clone, Debug)]
pub struct CardAssets {
    pub cover: Cover,
    /// Square QR bitmap encoding the record's source URL.
    pub qr: Arc<RgbaImage>,
    /// Why the cover fell back to the placeholder, if it did.
    pub cover_issue: Option<AssetError>,
}

/// The external collaborators a batch pulls pages, covers and QR symbols from.
#[derive(Clone, Copy)]
pub struct CardSources<'a> {
    pub pages: &'a dyn PageSource,
    pub covers: &'a dyn CoverSource,
    pub qr: &'a dyn QrEncoder,
}

impl std::fmt::Debug for CardSources<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardSources").finish_non_exhaustive()
    }
}

/// Resolve the cover and QR bitmaps for `record`.
///
/// A missing source URL is fatal. Cover failures degrade to [`Cover::Placeholder`] and are
/// reported through [`CardAssets::cover_issue`].
#[tracing::instrument(skip_all, fields(url = %record.source_url))]
pub fn resolve_assets(
    record: &ReleaseRecord,
    covers: &dyn CoverSource,
    qr: &dyn QrEncoder,
    qr_size: u32,
) -> Result<CardAssets, AssetError> {
    if record.source_url.trim().is_empty() {
        return Err(AssetError::UnresolvableUrl);
    }
    let qr = Arc::new(qr.encode(&record.source_url, qr_size)?);

    let (cover, cover_issue) = match fetch_cover(record, covers) {
        Ok(img) => (Cover::Image(Arc::new(img)), None),
        Err(err) => {
            tracing::warn!(error = %err, "cover unavailable; using placeholder");
            (Cover::Placeholder, Some(err))
        }
    };

    Ok(CardAssets {
        cover,
        qr,
        cover_issue,
    })
}

fn fetch_cover(record: &ReleaseRecord, covers: &dyn CoverSource) -> Result<RgbaImage, AssetError> {
    let cover_ref = record
        .cover_ref
        .as_deref()
        .ok_or_else(|| AssetError::CoverFetch("page has no cover reference".into()))?;
    let bytes = covers
        .cover_bytes(cover_ref)
        .map_err(|e| AssetError::CoverFetch(format!("{e:#}")))?;
    decode_cover(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
