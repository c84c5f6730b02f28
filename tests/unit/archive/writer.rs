use super::*;
use crate::{
    assets::{
        qr::QrCodeEncoder,
        resolve::CardSources,
        source::NoCovers,
    },
    batch::compose::{BatchJob, BatchOptions, run_batch},
    extract::record::ReleaseLink,
    foundation::config::CardConfig,
};

struct NoPages;

impl crate::assets::source::PageSource for NoPages {
    fn page_markup(&self, url: &str) -> anyhow::Result<String> {
        anyhow::bail!("offline: {url}")
    }
}

fn report(dated: &[bool]) -> BatchReport {
    let jobs: Vec<BatchJob> = dated
        .iter()
        .enumerate()
        .map(|(i, dated)| {
            let date = if *dated { "<p>発売日：2024年1月17日</p>" } else { "" };
            BatchJob::with_markup(
                ReleaseLink::event(format!("https://lantis.jp/release-item/LACA-{i}.html")),
                format!("<h2>Disc {i}</h2>{date}<p>01：Song</p>"),
            )
        })
        .collect();
    let sources = CardSources {
        pages: &NoPages,
        covers: &NoCovers,
        qr: &QrCodeEncoder,
    };
    run_batch(
        &jobs,
        sources,
        &CardConfig::default(),
        None,
        &BatchOptions::default(),
    )
    .unwrap()
}

fn zip_names(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

#[test]
fn writes_cards_sheet_manifest_and_zip() {
    let dir = tempfile::TempDir::new().unwrap();
    let opts = ArchiveOptions {
        out_dir: dir.path().to_path_buf(),
        out_prefix: "week".to_string(),
    };
    let report = report(&[true, true]);
    let written = write_batch(&report, &opts).unwrap();

    assert_eq!(written.cards.len(), 2);
    assert!(written.cards.iter().all(|p| p.exists()));
    assert!(written.cards[0].starts_with(dir.path().join("week_cards")));
    assert_eq!(written.merged.as_deref(), Some(opts.merged_path().as_path()));
    assert!(opts.merged_path().exists());

    let merged = image::open(opts.merged_path()).unwrap();
    let sheet = report.sheet.as_ref().unwrap();
    assert_eq!(merged.width(), sheet.image.width());
    assert_eq!(merged.height(), sheet.image.height());

    let manifest: Vec<crate::batch::sheet::ManifestEntry> =
        serde_json::from_slice(&std::fs::read(opts.manifest_path()).unwrap()).unwrap();
    assert_eq!(manifest, sheet.manifest);

    assert_eq!(
        zip_names(&opts.zip_path()),
        vec![
            "week_cards/01_https_lantis.jp_release-item_LACA-0.html.png".to_string(),
            "week_cards/02_https_lantis.jp_release-item_LACA-1.html.png".to_string(),
            "week_manifest.json".to_string(),
            "week_merged.png".to_string(),
        ]
    );
}

#[test]
fn skipped_cards_are_not_written() {
    let dir = tempfile::TempDir::new().unwrap();
    let opts = ArchiveOptions {
        out_dir: dir.path().to_path_buf(),
        out_prefix: "p".to_string(),
    };
    let written = write_batch(&report(&[false, true]), &opts).unwrap();
    assert_eq!(written.cards.len(), 1);
    assert!(
        written.cards[0]
            .to_string_lossy()
            .ends_with("02_https_lantis.jp_release-item_LACA-1.html.png")
    );
}

#[test]
fn empty_batch_writes_no_sheet() {
    let dir = tempfile::TempDir::new().unwrap();
    let opts = ArchiveOptions {
        out_dir: dir.path().to_path_buf(),
        out_prefix: "none".to_string(),
    };
    let written = write_batch(&report(&[false]), &opts).unwrap();
    assert!(written.cards.is_empty());
    assert_eq!(written.merged, None);
    assert!(!opts.zip_path().exists());
    assert!(opts.cards_dir().is_dir());
}
