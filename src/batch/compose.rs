use rayon::prelude::*;

use crate::{
    assets::{
        resolve::{CardSources, resolve_assets},
        source::safe_name,
    },
    batch::sheet::{MergedSheet, SheetConfig, stack_cards},
    extract::{machine::extract_release, page::PageText, record::{ReleaseLink, ReleaseRecord}},
    foundation::{
        config::CardConfig,
        error::{AssetError, CardError, CardResult},
    },
    render::{card::CardImage, pipeline::render_card},
    text::{engine::TextEngine, font::FontFace},
};

/// One release to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchJob {
    pub link: ReleaseLink,
    /// Page markup already at hand; fetched from the page source when `None`.
    pub markup: Option<String>,
}

impl BatchJob {
    pub fn new(link: ReleaseLink) -> Self {
        Self { link, markup: None }
    }

    pub fn with_markup(link: ReleaseLink, markup: impl Into<String>) -> Self {
        Self {
            link,
            markup: Some(markup.into()),
        }
    }

    fn label(&self) -> String {
        self.link.display_url().unwrap_or("<no url>").to_string()
    }
}

#[derive(Clone, Debug, Default)]
pub struct BatchThreading {
    pub parallel: bool,
    /// Worker count; rayon's default when `None`.
    pub threads: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    pub threading: BatchThreading,
    pub sheet: SheetConfig,
}

/// A card that made it through the whole pipeline.
#[derive(Clone, Debug)]
pub struct RenderedCard {
    /// Position in the batch input.
    pub index: usize,
    pub record: ReleaseRecord,
    pub card: CardImage,
    /// `NN_<safe url>.png`, numbered from 1 by input position.
    pub file_name: String,
    /// Set when the cover fell back to the placeholder.
    pub cover_issue: Option<AssetError>,
}

/// A job that failed; the rest of the batch is unaffected.
#[derive(Debug)]
pub struct SkippedCard {
    pub index: usize,
    /// Title when extraction got that far, otherwise the URL.
    pub label: String,
    pub error: CardError,
}

#[derive(Debug)]
pub struct BatchReport {
    /// Successful cards in input order.
    pub cards: Vec<RenderedCard>,
    /// Failed jobs in input order.
    pub skipped: Vec<SkippedCard>,
    /// `None` when no card succeeded.
    pub sheet: Option<MergedSheet>,
}

impl BatchReport {
    /// `N rendered, M skipped` followed by one line per skip.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} rendered, {} skipped",
            self.cards.len(),
            self.skipped.len()
        );
        for skip in &self.skipped {
            out.push_str(&format!(
                "\n  #{:02} {}: {}",
                skip.index + 1,
                skip.label,
                skip.error
            ));
        }
        out
    }
}

/// Render every job, isolating failures per job, then stack the successes.
///
/// Outcomes are collected as an ordered list of independent results, so a failing job
/// never aborts or reorders the others. Only batch-wide problems (bad config, bad thread
/// count, unusable font) are returned as `Err`.
#[tracing::instrument(skip_all, fields(jobs = jobs.len(), parallel = opts.threading.parallel))]
pub fn run_batch(
    jobs: &[BatchJob],
    sources: CardSources<'_>,
    config: &CardConfig,
    font: Option<&FontFace>,
    opts: &BatchOptions,
) -> CardResult<BatchReport> {
    config.validate()?;
    let mut engine = TextEngine::new(font)?;

    let outcomes: Vec<Result<RenderedCard, SkippedCard>> = if !opts.threading.parallel {
        jobs.iter()
            .enumerate()
            .map(|(index, job)| render_job(index, job, sources, config, &mut engine))
            .collect()
    } else {
        let pool = build_thread_pool(opts.threading.threads)?;
        pool.install(|| {
            jobs.par_iter()
                .enumerate()
                .map_init(
                    || TextEngine::new(font),
                    |worker_engine, (index, job)| match worker_engine {
                        Ok(engine) => render_job(index, job, sources, config, engine),
                        Err(e) => Err(SkippedCard {
                            index,
                            label: job.label(),
                            error: CardError::font(e.to_string()),
                        }),
                    },
                )
                .collect()
        })
    };

    let mut cards = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(card) => cards.push(card),
            Err(skip) => {
                tracing::warn!(index = skip.index, label = %skip.label, error = %skip.error, "skipped card");
                skipped.push(skip);
            }
        }
    }

    let sheet = if cards.is_empty() {
        None
    } else {
        Some(stack_cards(&cards, &opts.sheet)?)
    };

    let report = BatchReport {
        cards,
        skipped,
        sheet,
    };
    tracing::info!("{}", report.summary());
    Ok(report)
}

fn render_job(
    index: usize,
    job: &BatchJob,
    sources: CardSources<'_>,
    config: &CardConfig,
    engine: &mut TextEngine,
) -> Result<RenderedCard, SkippedCard> {
    let skip = |label: String, error: CardError| SkippedCard {
        index,
        label,
        error,
    };

    let url = job
        .link
        .display_url()
        .map_err(|e| skip(job.label(), e.into()))?;
    let page = match &job.markup {
        Some(markup) => PageText::from_html(markup),
        None => {
            let markup = sources
                .pages
                .page_markup(url)
                .map_err(|e| skip(job.label(), e.into()))?;
            PageText::from_html(&markup)
        }
    };

    let record = extract_release(&page, &job.link).map_err(|e| skip(job.label(), e.into()))?;
    let assets = resolve_assets(&record, sources.covers, sources.qr, config.qr_size)
        .map_err(|e| skip(record.title.clone(), e.into()))?;
    let card = render_card(&record, &assets, config, engine)
        .map_err(|e| skip(record.title.clone(), e))?;

    Ok(RenderedCard {
        index,
        file_name: format!("{:02}_{}.png", index + 1, safe_name(&record.source_url)),
        cover_issue: assets.cover_issue,
        record,
        card,
    })
}

fn build_thread_pool(threads: Option<usize>) -> CardResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CardError::config(
            "batch threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CardError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/compose.rs"]
mod tests;
