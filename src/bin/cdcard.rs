use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use cdcard::{
    ArchiveOptions, BatchJob, BatchOptions, BatchThreading, CardConfig, CardSources, CoverFile,
    CoverSource, FontFace, MirrorDir, NoCovers, PageSource, PageText, QrCodeEncoder, ReleaseLink,
    TextEngine,
};

#[derive(Parser, Debug)]
#[command(name = "cdcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one release page as a card PNG.
    Card(CardArgs),
    /// Render many release pages, then write the merged sheet, manifest and zip.
    Batch(BatchArgs),
    /// Print a schedule dump as a dated text listing.
    List(ListArgs),
}

/// Options shared by every rendering command.
#[derive(Parser, Debug)]
struct RenderOpts {
    /// Card configuration JSON. Unset fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font file with CJK coverage. Overrides the config file.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Card width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Upper bound for the card height; taller cards are scaled down.
    #[arg(long)]
    max_height: Option<u32>,
}

#[derive(Parser, Debug)]
struct CardArgs {
    /// Saved release page (HTML). Read from `--mirror` when omitted.
    #[arg(long)]
    page: Option<PathBuf>,

    /// Directory of mirrored pages and covers, keyed by URL.
    #[arg(long)]
    mirror: Option<PathBuf>,

    /// Release-detail URL; encoded in the QR code when present.
    #[arg(long)]
    event_url: Option<String>,

    /// Fallback URL used when there is no event URL.
    #[arg(long)]
    page_url: Option<String>,

    /// Cover image file. Takes precedence over the mirror.
    #[arg(long)]
    cover: Option<PathBuf>,

    #[command(flatten)]
    render: RenderOpts,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Schedule dump JSON; its release links become the batch.
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Text file with one release URL per line, appended after the schedule links.
    #[arg(long)]
    urls: Option<PathBuf>,

    /// Directory of mirrored pages and covers, keyed by URL.
    #[arg(long)]
    mirror: PathBuf,

    /// Output directory.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Prefix for every output artifact.
    #[arg(long, default_value = "cards")]
    out_prefix: String,

    /// Render cards on a rayon pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    #[command(flatten)]
    render: RenderOpts,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Schedule dump JSON.
    #[arg(long)]
    schedule: PathBuf,

    /// Display offset from UTC, in hours.
    #[arg(long, default_value_t = 9, allow_hyphen_values = true)]
    utc_offset: i32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Card(args) => cmd_card(args),
        Command::Batch(args) => cmd_batch(args),
        Command::List(args) => cmd_list(args),
    }
}

fn load_config(opts: &RenderOpts) -> anyhow::Result<CardConfig> {
    let mut config = match &opts.config {
        Some(path) => CardConfig::from_path(path)?,
        None => CardConfig::default(),
    };
    if let Some(width) = opts.width {
        config.width = width;
    }
    if let Some(max_height) = opts.max_height {
        config.max_height = max_height;
    }
    if opts.font.is_some() {
        config.font = opts.font.clone();
    }
    config.validate()?;
    Ok(config)
}

fn load_font(config: &CardConfig) -> anyhow::Result<Option<FontFace>> {
    let font = FontFace::resolve(config.font.as_deref())?;
    if let Some(face) = &font {
        tracing::info!(origin = face.origin(), "using font");
    }
    Ok(font)
}

fn cmd_card(args: CardArgs) -> anyhow::Result<()> {
    let config = load_config(&args.render)?;
    let font = load_font(&config)?;

    let link = ReleaseLink::new(args.event_url, args.page_url.unwrap_or_default());
    let url = link.display_url()?;
    let mirror = args.mirror.map(MirrorDir::new);

    let markup = match (&args.page, &mirror) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("read page '{}'", path.display()))?,
        (None, Some(mirror)) => mirror.page_markup(url)?,
        (None, None) => anyhow::bail!("either --page or --mirror is required"),
    };
    let page = PageText::from_html(&markup);
    let record = cdcard::extract_release(&page, &link)?;

    let cover_file = args.cover.map(CoverFile);
    let covers: &dyn CoverSource = match (&cover_file, &mirror) {
        (Some(file), _) => file,
        (None, Some(mirror)) => mirror,
        (None, None) => &NoCovers,
    };
    let assets = cdcard::resolve_assets(&record, covers, &QrCodeEncoder, config.qr_size)?;

    let mut engine = TextEngine::new(font.as_ref())?;
    let card = cdcard::render_card(&record, &assets, &config, &mut engine)?;
    card.write_png(&args.out)?;

    if card.url_overflows {
        eprintln!("warning: url does not fit at {}px", card.url_font_px);
    }
    eprintln!("wrote {} ({}x{})", args.out.display(), card.width, card.height);
    Ok(())
}

fn read_url_list(path: &Path) -> anyhow::Result<Vec<ReleaseLink>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read url list '{}'", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(ReleaseLink::event)
        .collect())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let config = load_config(&args.render)?;
    let font = load_font(&config)?;

    let mut links = Vec::new();
    if let Some(path) = &args.schedule {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read schedule '{}'", path.display()))?;
        links.extend(cdcard::batch_links(&cdcard::parse_schedule(&json)?));
    }
    if let Some(path) = &args.urls {
        links.extend(read_url_list(path)?);
    }
    if links.is_empty() {
        anyhow::bail!("no release links; pass --schedule and/or --urls");
    }
    let jobs: Vec<BatchJob> = links.into_iter().map(BatchJob::new).collect();

    let mirror = MirrorDir::new(&args.mirror);
    let sources = CardSources {
        pages: &mirror,
        covers: &mirror,
        qr: &QrCodeEncoder,
    };
    let opts = BatchOptions {
        threading: BatchThreading {
            parallel: args.parallel,
            threads: args.threads,
        },
        ..Default::default()
    };
    let report = cdcard::run_batch(&jobs, sources, &config, font.as_ref(), &opts)?;
    eprintln!("{}", report.summary());

    let written = cdcard::write_batch(
        &report,
        &ArchiveOptions {
            out_dir: args.out_dir,
            out_prefix: args.out_prefix,
        },
    )?;
    for path in written
        .cards
        .iter()
        .chain(&written.merged)
        .chain(&written.manifest)
        .chain(&written.zip)
    {
        eprintln!("wrote {}", path.display());
    }
    if report.cards.is_empty() {
        anyhow::bail!("no card rendered");
    }
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let offset = chrono::FixedOffset::east_opt(args.utc_offset.saturating_mul(3600))
        .with_context(|| format!("utc offset out of range: {}h", args.utc_offset))?;
    let json = std::fs::read_to_string(&args.schedule)
        .with_context(|| format!("read schedule '{}'", args.schedule.display()))?;
    let entries = cdcard::parse_schedule(&json)?;
    println!("{}", cdcard::render_listing(&entries, offset));
    Ok(())
}
