//! Combined pipeline configuration
//!
//! Groups the tunables of every stage so front ends can load them from one
//! document. Each section falls back to its defaults when absent.

use crate::error::Result;
use crate::subtitle::RenderConfig;
use crate::sync::SyncPolicy;
use crate::timeline::HistoryConfig;

/// Settings for synchronization, editing and rendering
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KaraokeConfig {
    /// Similarity gate and aligner
    pub sync: SyncPolicy,
    /// Undo depth
    pub history: HistoryConfig,
    /// Subtitle look
    pub render: RenderConfig,
}

impl KaraokeConfig {
    /// Check every section
    ///
    /// # Errors
    ///
    /// Returns [`crate::KaraokeError::InvalidConfig`] naming the first
    /// unusable value.
    pub fn validate(&self) -> Result<()> {
        self.sync.validate()?;
        self.render.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::{EffectSelection, SubtitlePosition, VisibilityWindow, WebColor};

    #[test]
    fn defaults_are_valid() {
        let config = KaraokeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync.similarity_threshold, 0.40);
        assert_eq!(config.history.max_snapshots, 100);
        assert_eq!(config.render.effect, EffectSelection::Classic);
        assert_eq!(config.render.position, SubtitlePosition::Bottom);
        assert_eq!(config.render.window, VisibilityWindow::Balanced);
        assert_eq!(config.render.style.font, "Arial");
        assert_eq!(config.render.style.font_size, 60);
        assert_eq!(config.render.style.active_color, WebColor::GREEN);
        assert_eq!(config.render.style.passive_color, WebColor::WHITE);
    }

    #[test]
    fn invalid_section_fails_validation() {
        let mut config = KaraokeConfig::default();
        config.sync.similarity_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let json = r##"{
            "sync": {"similarity_threshold": 0.55},
            "render": {"effect": "heart-marker", "active_color": "#FF0000", "canvas": {"width": 1280, "height": 720}}
        }"##;
        let config: KaraokeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sync.similarity_threshold, 0.55);
        assert_eq!(config.sync.insertion_duration, 0.5);
        assert_eq!(config.render.effect, EffectSelection::HeartMarker);
        assert_eq!(config.render.style.active_color, WebColor::rgb(0xFF, 0, 0));
        assert_eq!(config.render.style.canvas.width, 1280);
        assert_eq!(config.render.style.font, "Arial");
        assert_eq!(config.history.max_snapshots, 100);
    }
}
