use std::sync::Arc;

use image::RgbaImage;

use crate::foundation::{core::premultiply_rgba8_in_place, error::AssetError};

/// Raster image in premultiplied RGBA8 form, ready for the rasterizer.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded cover bytes (PNG, JPEG, WebP, ...) into straight RGBA8.
pub fn decode_cover(bytes: &[u8]) -> Result<RgbaImage, AssetError> {
    let dyn_img =
        image::load_from_memory(bytes).map_err(|e| AssetError::CoverDecode(e.to_string()))?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(AssetError::CoverDecode("image has no pixels".into()));
    }
    Ok(rgba)
}

/// Convert a straight-alpha bitmap to premultiplied bytes.
pub fn prepare_image(img: &RgbaImage) -> PreparedImage {
    let (width, height) = img.dimensions();
    let mut rgba8_premul = img.as_raw().clone();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
