use crate::{
    assets::resolve::CardAssets,
    extract::record::ReleaseRecord,
    foundation::{config::CardConfig, error::CardResult},
    layout::solver::compose_plan,
    render::{card::CardImage, cpu::rasterize},
    text::engine::TextEngine,
};

/// Lay out + rasterize a single card.
///
/// Pipeline:
/// 1. [`compose_plan`](crate::compose_plan)
/// 2. [`rasterize`](crate::rasterize)
///
/// The result is never taller than `config.max_height`; oversized content is downscaled.
#[tracing::instrument(skip_all, fields(url = %record.source_url))]
pub fn render_card(
    record: &ReleaseRecord,
    assets: &CardAssets,
    config: &CardConfig,
    engine: &mut TextEngine,
) -> CardResult<CardImage> {
    let plan = compose_plan(record, assets, config, engine)?;
    let pixels = rasterize(&plan)?;
    tracing::debug!(
        width = plan.width,
        height = plan.height,
        scale = plan.scale,
        "rendered card"
    );
    Ok(CardImage::from_plan(&plan, pixels))
}
