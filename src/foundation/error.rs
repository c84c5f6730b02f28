/// Convenience result type used across cdcard.
pub type CardResult<T> = Result<T, CardError>;

/// Failures while turning page text into a [`ReleaseRecord`](crate::ReleaseRecord).
///
/// Fatal for the record being extracted, never for a batch.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No date-shaped token anywhere in the page.
    #[error("missing release date")]
    MissingDate,

    /// No heading and no usable title line.
    #[error("missing title")]
    MissingTitle,

    /// The page could not be read as text lines at all.
    #[error("unparseable page: {0}")]
    Unparseable(String),
}

/// Failures while obtaining the cover and QR bitmaps.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Neither an event URL nor a fallback page URL is available.
    #[error("no url to encode")]
    UnresolvableUrl,

    /// The cover source could not deliver bytes.
    #[error("cover fetch failed: {0}")]
    CoverFetch(String),

    /// Cover bytes were delivered but are not a decodable image.
    #[error("cover decode failed: {0}")]
    CoverDecode(String),

    /// The QR symbol could not be generated.
    #[error("qr generation failed: {0}")]
    Qr(String),
}

impl AssetError {
    /// Whether the card can still be rendered (with a placeholder) despite this error.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::CoverFetch(_) | Self::CoverDecode(_))
    }
}

/// Malformed geometry inputs. Oversized content is never a layout error.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The right panel has no room for text after padding.
    #[error("zero usable panel width")]
    ZeroPanelWidth,

    /// A configuration value is out of range.
    #[error("invalid layout config: {0}")]
    InvalidConfig(String),

    /// The rasterizer cannot allocate a canvas this large.
    #[error("canvas {width}x{height} exceeds rasterizer limits")]
    CanvasTooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

/// Top-level error taxonomy used by cdcard APIs.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Field extraction failed.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Cover or QR resolution failed.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Geometry inputs were malformed.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Fonts could not be loaded or registered.
    #[error("font error: {0}")]
    Font(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`CardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`LayoutError::InvalidConfig`] wrapped in [`CardError::Layout`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Layout(LayoutError::InvalidConfig(msg.into()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
