use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};

use crate::foundation::error::AssetError;

/// Quiet zone kept around the symbol, in modules.
pub const QR_BORDER_MODULES: u32 = 1;

const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Turns a URL into a square QR bitmap.
pub trait QrEncoder: Send + Sync {
    /// Encode `text` into an opaque square bitmap exactly `size_px` wide.
    fn encode(&self, text: &str, size_px: u32) -> Result<RgbaImage, AssetError>;
}

/// [`QrEncoder`] backed by the `qrcode` crate (error correction level M).
#[derive(Clone, Copy, Debug, Default)]
pub struct QrCodeEncoder;

impl QrEncoder for QrCodeEncoder {
    fn encode(&self, text: &str, size_px: u32) -> Result<RgbaImage, AssetError> {
        if text.is_empty() {
            return Err(AssetError::UnresolvableUrl);
        }
        if size_px == 0 {
            return Err(AssetError::Qr("qr size must be > 0".into()));
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
            .map_err(|e| AssetError::Qr(e.to_string()))?;
        let symbol = code.width() as u32;
        let colors = code.to_colors();

        let modules = symbol + 2 * QR_BORDER_MODULES;
        let module_px = size_px / modules;
        if module_px == 0 {
            return Err(AssetError::Qr(format!(
                "{modules} modules do not fit in {size_px}px"
            )));
        }
        // Integer module size; the leftover becomes extra quiet zone split on both sides.
        let offset = (size_px - module_px * symbol) / 2;

        let mut img = RgbaImage::from_pixel(size_px, size_px, LIGHT);
        for (i, color) in colors.iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let mx = i as u32 % symbol;
            let my = i as u32 / symbol;
            let x0 = offset + mx * module_px;
            let y0 = offset + my * module_px;
            for y in y0..y0 + module_px {
                for x in x0..x0 + module_px {
                    img.put_pixel(x, y, DARK);
                }
            }
        }
        Ok(img)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/qr.rs"]
mod tests;
