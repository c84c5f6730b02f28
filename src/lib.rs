//! cdcard composes compact release cards for CD singles and albums.
//!
//! A card is one PNG with a left column (release date, title, cover art) and a right column
//! (performer credit, tracklist with staff credits, QR code and the URL it encodes). The
//! pipeline is:
//!
//! - Reduce a fetched release page to [`PageText`] and extract a [`ReleaseRecord`]
//! - Resolve the cover and QR bitmaps into [`CardAssets`]
//! - Lay the card out as a [`CardPlan`] and rasterize it into a [`CardImage`]
//!
//! [`run_batch`] drives the same pipeline over many pages, isolating failures per page and
//! stacking the successful cards into one merged sheet; [`write_batch`] puts the results on
//! disk.
#![forbid(unsafe_code)]

mod foundation;

/// Batch artifacts on disk.
pub mod archive;
/// Cover and QR resolution.
pub mod assets;
/// Batch composition and the merged sheet.
pub mod batch;
/// Release page field extraction.
pub mod extract;
/// Card geometry.
pub mod layout;
/// Rasterization.
pub mod render;
/// Portal schedule dumps.
pub mod schedule;
/// Fonts and text measurement.
pub mod text;

pub use crate::foundation::config::{
    CardConfig, FontSizes, MAX_CANVAS_EDGE, Palette, PanelGeometry, ShrinkPolicy, Spacing,
};
pub use crate::foundation::core::{PanelRect, Rgba8};
pub use crate::foundation::error::{
    AssetError, CardError, CardResult, ExtractionError, LayoutError,
};

pub use crate::archive::writer::{ArchiveOptions, WrittenArtifacts, write_batch};
pub use crate::assets::qr::{QrCodeEncoder, QrEncoder};
pub use crate::assets::resolve::{CardAssets, CardSources, Cover, resolve_assets};
pub use crate::assets::source::{CoverFile, CoverSource, MirrorDir, NoCovers, PageSource, safe_name};
pub use crate::batch::compose::{
    BatchJob, BatchOptions, BatchReport, BatchThreading, RenderedCard, SkippedCard, run_batch,
};
pub use crate::batch::sheet::{ManifestEntry, MergedSheet, SheetConfig, stack_cards};
pub use crate::extract::machine::extract_release;
pub use crate::extract::page::PageText;
pub use crate::extract::record::{ReleaseLink, ReleaseRecord, TrackEntry};
pub use crate::layout::plan::CardPlan;
pub use crate::layout::solver::compose_plan;
pub use crate::render::card::CardImage;
pub use crate::render::cpu::rasterize;
pub use crate::render::pipeline::render_card;
pub use crate::schedule::portal::{ScheduleEntry, batch_links, parse_schedule, render_listing};
pub use crate::text::engine::TextEngine;
pub use crate::text::font::FontFace;
