//! Subcommand implementations and the timeline file helpers they share

pub mod edit;
pub mod export;
pub mod render;
pub mod sync;

use anyhow::{Context, Result};
use karaoke_core::subtitle::{parse_srt, write_atomically, SubtitleFormat};
use karaoke_core::timeline::refine;
use karaoke_core::Timeline;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a timeline saved as JSON, or import an SRT file
///
/// Either way the cues are repaired on the way in.
pub fn load_timeline(path: &Path) -> Result<Timeline> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading timeline {}", path.display()))?;

    let timeline = if SubtitleFormat::from_path(path) == Some(SubtitleFormat::Srt) {
        refine(parse_srt(&content))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("parsing timeline {}", path.display()))?
    };
    debug!(path = %path.display(), cues = timeline.len(), "loaded timeline");
    Ok(timeline)
}

/// Write `timeline` as pretty JSON, replacing `path` atomically
pub fn save_timeline(path: &Path, timeline: &Timeline) -> Result<()> {
    let json = serde_json::to_string_pretty(timeline).context("serializing timeline")?;
    write_atomically(path, &json).with_context(|| format!("saving timeline {}", path.display()))?;
    debug!(path = %path.display(), cues = timeline.len(), "saved timeline");
    Ok(())
}
