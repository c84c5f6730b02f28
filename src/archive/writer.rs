use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    batch::compose::BatchReport,
    foundation::error::{CardError, CardResult},
};

/// Where batch artifacts go.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveOptions {
    pub out_dir: PathBuf,
    /// Prefix shared by every artifact name.
    pub out_prefix: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            out_prefix: "cards".to_string(),
        }
    }
}

impl ArchiveOptions {
    pub fn cards_dir(&self) -> PathBuf {
        self.out_dir.join(format!("{}_cards", self.out_prefix))
    }

    pub fn merged_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}_merged.png", self.out_prefix))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}_manifest.json", self.out_prefix))
    }

    pub fn zip_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}_merged.zip", self.out_prefix))
    }
}

/// Paths written by [`write_batch`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub cards: Vec<PathBuf>,
    /// `None` when the batch produced no sheet.
    pub merged: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub zip: Option<PathBuf>,
}

/// Write every card of `report`, then the sheet, manifest and zip when a sheet exists.
///
/// Zip entries: `<prefix>_merged.png`, `<prefix>_manifest.json`, then
/// `<prefix>_cards/<file>` for each card in input order.
#[tracing::instrument(skip_all, fields(out_dir = %opts.out_dir.display(), cards = report.cards.len()))]
pub fn write_batch(report: &BatchReport, opts: &ArchiveOptions) -> CardResult<WrittenArtifacts> {
    let cards_dir = opts.cards_dir();
    std::fs::create_dir_all(&cards_dir)
        .with_context(|| format!("create cards dir '{}'", cards_dir.display()))?;

    let mut written = WrittenArtifacts::default();
    let mut card_pngs = Vec::with_capacity(report.cards.len());
    for card in &report.cards {
        let png = card.card.encode_png()?;
        let path = cards_dir.join(&card.file_name);
        std::fs::write(&path, &png).with_context(|| format!("write png '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote card");
        written.cards.push(path);
        card_pngs.push((card.file_name.as_str(), png));
    }

    let Some(sheet) = &report.sheet else {
        tracing::warn!("no cards rendered; skipping merged sheet");
        return Ok(written);
    };

    let mut merged_png = Vec::new();
    sheet
        .image
        .write_to(&mut std::io::Cursor::new(&mut merged_png), image::ImageFormat::Png)
        .context("encode merged png")?;
    let merged = opts.merged_path();
    std::fs::write(&merged, &merged_png)
        .with_context(|| format!("write png '{}'", merged.display()))?;

    let manifest_json = serde_json::to_vec_pretty(&sheet.manifest)
        .map_err(|e| CardError::serde(e.to_string()))?;
    let manifest = opts.manifest_path();
    std::fs::write(&manifest, &manifest_json)
        .with_context(|| format!("write manifest '{}'", manifest.display()))?;

    let zip = opts.zip_path();
    let cards_prefix = format!("{}_cards", opts.out_prefix);
    let mut entries: Vec<(String, &[u8])> = vec![
        (file_name_of(&merged), merged_png.as_slice()),
        (file_name_of(&manifest), manifest_json.as_slice()),
    ];
    for (name, png) in &card_pngs {
        entries.push((format!("{cards_prefix}/{name}"), png.as_slice()));
    }
    write_zip(&zip, &entries)?;

    written.merged = Some(merged);
    written.manifest = Some(manifest);
    written.zip = Some(zip);
    Ok(written)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_zip(path: &Path, entries: &[(String, &[u8])]) -> CardResult<()> {
    let file = File::create(path).with_context(|| format!("create zip '{}'", path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("start zip entry '{name}'"))?;
        zip.write_all(bytes)
            .with_context(|| format!("write zip entry '{name}'"))?;
    }
    zip.finish()
        .with_context(|| format!("finish zip '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/archive/writer.rs"]
mod tests;
