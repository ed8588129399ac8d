use std::io::{BufRead, Write};
use std::sync::Arc;

use chrono::NaiveDate;
use earth_gif_catalog::{fetch_all, CatalogClient, CatalogError};
use earth_gif_common::config::Config;
use earth_gif_render::{
    render_animation, write_atomic, CaptionStyle, Captioner, Palette, RenderError,
};
use tracing::{info, warn};

use crate::dates::{self, DateError, Resolution};
use crate::prompt;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("date prompt: {0}")]
    Prompt(#[from] std::io::Error),
    #[error("list_frames_for_date: no frames available for {0}")]
    NoFrames(String),
    #[error("render task failed: {0}")]
    Task(String),
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames: usize,
    pub captions: Vec<String>,
    pub gif_bytes: usize,
}

/// Turn a requested day into one the catalog has imagery for, asking the
/// operator when the day itself is missing and there are two candidates.
pub async fn select_date<R: BufRead, W: Write>(
    client: &CatalogClient,
    requested: NaiveDate,
    input: &mut R,
    output: &mut W,
) -> Result<NaiveDate, PipelineError> {
    let available = client.list_all_dates().await?;
    let date = match dates::resolve(&available, requested)? {
        Resolution::Exact(date) => date,
        Resolution::Nearest(date) => {
            warn!(requested = %requested, using = %date, "no imagery on requested date");
            date
        }
        Resolution::Choose { newer, older } => prompt::choose_date(input, output, newer, older)?,
    };
    Ok(date)
}

/// Fetch every frame for `date` (latest day when `None`), caption and encode
/// them, and atomically replace the animation artifact.
///
/// Any failure aborts the run before the artifact is touched.
pub async fn run(
    client: Arc<CatalogClient>,
    config: &Config,
    date: Option<&str>,
) -> Result<RunSummary, PipelineError> {
    let captioner = Captioner::load(&config.render.font_path, CaptionStyle::from(&config.render))?;

    let descriptors = client.list_frames_for_date(date).await?;
    if descriptors.is_empty() {
        return Err(PipelineError::NoFrames(date.unwrap_or("the latest day").to_string()));
    }
    info!(frames = descriptors.len(), date = date.unwrap_or("latest"), "catalog listed frames");

    let frames = fetch_all(client, descriptors, config.catalog.max_concurrent_fetches).await?;
    info!(frames = frames.len(), "all frames retrieved");

    if !config.output.last_frame_path.as_os_str().is_empty() {
        if let Some(last) = frames.last() {
            write_atomic(&config.output.last_frame_path, &last.bytes).await?;
        }
    }

    info!("creating animation");
    let render_config = config.render.clone();
    let (gif, captions) = tokio::task::spawn_blocking(move || -> Result<_, RenderError> {
        let animation = render_animation(&frames, &captioner, &Palette::plan9(), &render_config)?;
        let captions: Vec<String> = animation.captions().map(str::to_string).collect();
        Ok((animation.encode()?, captions))
    })
    .await
    .map_err(|e| PipelineError::Task(e.to_string()))??;

    write_atomic(&config.output.gif_path, &gif).await?;
    info!(
        frames = captions.len(),
        bytes = gif.len(),
        path = config.output.gif_path.display().to_string(),
        "animation ready"
    );

    Ok(RunSummary {
        frames: captions.len(),
        captions,
        gif_bytes: gif.len(),
    })
}
