//! Configuration file for the command line tool
//!
//! A TOML document holding the pipeline settings (`[sync]`, `[history]`,
//! `[render]`) plus a `[tools]` table naming the external programs. A
//! missing file means defaults; flags given on the command line win over
//! both.

use anyhow::{Context, Result};
use karaoke_core::KaraokeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// External programs and recognizer defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Speech recognizer executable
    pub whisper: PathBuf,
    /// Video encoder executable
    pub ffmpeg: PathBuf,
    /// Recognition model
    pub model: String,
    /// Spoken language; detected when unset
    pub language: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            whisper: PathBuf::from("whisper"),
            ffmpeg: PathBuf::from("ffmpeg"),
            model: String::from("small"),
            language: None,
        }
    }
}

/// Everything the `karaoke` binary reads from its config file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub pipeline: KaraokeConfig,
    pub tools: ToolsConfig,
}

impl CliConfig {
    /// Conventional location: `<config dir>/karaoke/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("karaoke").join("config.toml"))
    }

    /// Load `explicit`, or the conventional file when it exists
    ///
    /// An explicitly named file must exist; the conventional one is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.pipeline.validate()?;
        Ok(config)
    }
}
