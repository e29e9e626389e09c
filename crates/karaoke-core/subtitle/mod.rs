//! Subtitle rendering and export
//!
//! A [`Timeline`] becomes either a plain SubRip file or a styled ASS script.
//! ASS output is built from [`CueMarkup`] lines produced by the
//! [`SubtitleEmitter`], one per cue plus optional marker lines.
//!
//! ```rust
//! use karaoke_core::subtitle::{RenderConfig, SubtitleFormat};
//! use karaoke_core::timeline::{refine, RawCue};
//!
//! let timeline = refine(vec![RawCue::new("Hello", 0.0, 0.5)]);
//! let srt = SubtitleFormat::Srt.render(&timeline, &RenderConfig::default());
//! assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:00,500\nHello"));
//! ```

pub mod ass;
pub mod effects;
pub mod emitter;
pub mod srt;
pub mod style;
pub mod timecode;
pub mod window;

pub use ass::render_ass;
pub use effects::{EffectSelection, Marker};
pub use emitter::{CueMarkup, SubtitleEmitter};
pub use srt::{parse_srt, render_srt};
pub use style::{Canvas, SubtitlePosition, SubtitleStyle, WebColor};
pub use window::{window, VisibilityWindow};

use crate::error::{KaraokeError, Result};
use crate::timeline::Timeline;
use core::fmt;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Everything that shapes an ASS export
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    /// Highlight effect for the active word
    pub effect: EffectSelection,
    /// Screen placement
    pub position: SubtitlePosition,
    /// Neighbouring cues shown with the active one
    pub window: VisibilityWindow,
    /// Font, colors and canvas
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub style: SubtitleStyle,
    /// Seed for effects with random placement
    pub seed: u64,
}

impl RenderConfig {
    /// Check the configuration can be rendered
    ///
    /// # Errors
    ///
    /// Returns [`KaraokeError::InvalidConfig`] if the style is unusable.
    pub fn validate(&self) -> Result<()> {
        self.style.validate()
    }
}

/// All lines for `timeline` under `config`
#[must_use]
pub fn emit(timeline: &Timeline, config: &RenderConfig) -> Vec<CueMarkup> {
    SubtitleEmitter::new(config).emit(timeline)
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SubtitleFormat {
    /// SubRip, text only
    Srt,
    /// Advanced SubStation Alpha, styled
    Ass,
}

impl SubtitleFormat {
    /// Usual file extension
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
        }
    }

    /// Format matching the extension of `path`, case-insensitively
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "srt" => Some(Self::Srt),
            "ass" | "ssa" => Some(Self::Ass),
            _ => None,
        }
    }

    /// Document text for `timeline`; `config` only matters for ASS
    #[must_use]
    pub fn render(self, timeline: &Timeline, config: &RenderConfig) -> String {
        match self {
            Self::Srt => render_srt(timeline),
            Self::Ass => render_ass(timeline, config),
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Write `timeline` to `path` in the format its extension names
///
/// # Errors
///
/// Returns [`KaraokeError::InvalidFormat`] for an unknown extension and
/// [`KaraokeError::Io`] if writing fails.
pub fn export_to_path(path: &Path, timeline: &Timeline, config: &RenderConfig) -> Result<SubtitleFormat> {
    let format = SubtitleFormat::from_path(path).ok_or_else(|| {
        KaraokeError::InvalidFormat(format!(
            "cannot tell subtitle format from '{}' (use .srt or .ass)",
            path.display()
        ))
    })?;
    write_atomically(path, &format.render(timeline, config))?;
    info!(path = %path.display(), %format, cues = timeline.len(), "exported subtitles");
    Ok(format)
}

/// Replace `path` with `contents` without leaving a partial file behind
///
/// The data goes to a temporary file in the same directory first, which is
/// then renamed over the target.
///
/// # Errors
///
/// Returns [`KaraokeError::Io`] if the temporary file cannot be written or
/// moved into place.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(directory)
        .map_err(|e| KaraokeError::io(format!("Failed to create temporary file: {e}")))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| KaraokeError::io(format!("Failed to write subtitle content: {e}")))?;
    file.persist(path)
        .map_err(|e| KaraokeError::io(format!("Failed to save {}: {}", path.display(), e.error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_from_extension() {
        assert_eq!(SubtitleFormat::from_path(&PathBuf::from("a.SRT")), Some(SubtitleFormat::Srt));
        assert_eq!(SubtitleFormat::from_path(&PathBuf::from("dir/b.ass")), Some(SubtitleFormat::Ass));
        assert_eq!(SubtitleFormat::from_path(&PathBuf::from("c.txt")), None);
        assert_eq!(SubtitleFormat::from_path(&PathBuf::from("noext")), None);
    }

    #[test]
    fn render_config_validation_delegates_to_style() {
        let mut config = RenderConfig::default();
        assert!(config.validate().is_ok());
        config.style.font_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_to_path(&dir.path().join("out.txt"), &Timeline::empty(), &RenderConfig::default())
            .unwrap_err();
        assert!(matches!(err, KaraokeError::InvalidFormat(_)));
    }
}
