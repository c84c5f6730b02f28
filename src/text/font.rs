use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{CardError, CardResult};

/// Family names tried, in order, when no font file is configured.
pub const CJK_FAMILIES: &[&str] = &[
    "Noto Sans CJK JP",
    "Noto Sans JP",
    "Source Han Sans JP",
    "Source Han Sans",
    "Hiragino Sans",
    "Hiragino Kaku Gothic ProN",
    "Yu Gothic",
    "Meiryo",
    "IPAexGothic",
    "IPAGothic",
    "TakaoGothic",
    "VL Gothic",
    "WenQuanYi Zen Hei",
];

/// Raw font bytes shared read-only between workers.
#[derive(Clone)]
pub struct FontFace {
    bytes: Arc<Vec<u8>>,
    index: u32,
    origin: String,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("origin", &self.origin)
            .finish()
    }
}

impl FontFace {
    pub fn from_bytes(bytes: Vec<u8>, index: u32, origin: impl Into<String>) -> CardResult<Self> {
        let origin = origin.into();
        if bytes.is_empty() {
            return Err(CardError::font(format!("font '{origin}' is empty")));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            index,
            origin,
        })
    }

    /// Load face 0 of the font file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> CardResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| CardError::font(format!("read font '{}': {e}", path.display())))?;
        Self::from_bytes(bytes, 0, path.display().to_string())
    }

    /// Query the system font database (plus `./fonts`) for a known CJK family.
    pub fn discover() -> Option<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        load_fonts_from_dir(&mut db, Path::new("fonts"));

        for name in CJK_FAMILIES.iter().copied() {
            let families = [usvg::fontdb::Family::Name(name)];
            let query = usvg::fontdb::Query {
                families: &families,
                ..Default::default()
            };
            let Some(id) = db.query(&query) else {
                continue;
            };
            if let Some((bytes, index)) = db.with_face_data(id, |data, index| (data.to_vec(), index))
            {
                tracing::debug!(font = name, "discovered system font");
                return Self::from_bytes(bytes, index, name).ok();
            }
        }
        None
    }

    /// Apply the font policy: an explicit path must load, otherwise try discovery.
    ///
    /// `Ok(None)` means no usable face exists and text runs in metrics-only mode.
    pub fn resolve(explicit: Option<&Path>) -> CardResult<Option<Self>> {
        if let Some(path) = explicit {
            return Self::from_path(path).map(Some);
        }
        let found = Self::discover();
        if found.is_none() {
            tracing::warn!("no CJK-capable font found; text will render as placeholder boxes");
        }
        Ok(found)
    }

    pub fn bytes(&self) -> &Arc<Vec<u8>> {
        &self.bytes
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Where the face came from (path or family name).
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path: PathBuf = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
