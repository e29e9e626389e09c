//! `karaoke render`: burn the styled script into a video
//!
//! The encoder writes to a staging file next to the destination, which
//! replaces the destination only once encoding has succeeded.

use super::load_timeline;
use crate::cli::RenderArgs;
use crate::config::CliConfig;
use crate::tools::FfmpegCommand;
use anyhow::{Context, Result};
use karaoke_core::collab::{CollaboratorWorker, Encoder, RenderJob};
use karaoke_core::subtitle::render_ass;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn run(args: &RenderArgs, config: &CliConfig) -> Result<()> {
    let timeline = load_timeline(&args.timeline)?;
    let mut render = config.pipeline.render.clone();
    args.style.apply(&mut render);
    render.validate()?;

    let script = tempfile::Builder::new()
        .prefix("karaoke-")
        .suffix(".ass")
        .tempfile()
        .context("creating subtitle script")?;
    fs::write(script.path(), render_ass(&timeline, &render)).context("writing subtitle script")?;

    let staging = staging_file(&args.out)?;
    let job = RenderJob {
        media: args.media.clone(),
        subtitles: script.path().to_path_buf(),
        output: staging.path().to_path_buf(),
    };

    let encoder = Arc::new(FfmpegCommand::new(&config.tools.ffmpeg));
    let worker = CollaboratorWorker::new(encoder.name());
    worker
        .encode(encoder, job)?
        .wait()
        .with_context(|| format!("rendering {}", args.out.display()))?;

    staging
        .persist(&args.out)
        .map_err(|e| e.error)
        .with_context(|| format!("moving video into place at {}", args.out.display()))?;
    info!(output = %args.out.display(), cues = timeline.len(), "render finished");
    println!("rendered {}", args.out.display());
    Ok(())
}

/// Empty file beside `output` with the same extension, so the encoder picks
/// the same container
fn staging_file(output: &Path) -> Result<tempfile::NamedTempFile> {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    tempfile::Builder::new()
        .prefix(".karaoke-")
        .suffix(&suffix)
        .tempfile_in(directory)
        .with_context(|| format!("creating staging file in {}", directory.display()))
}
