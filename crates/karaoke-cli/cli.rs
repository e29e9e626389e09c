//! Command line definitions

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use karaoke_core::subtitle::WebColor;
use karaoke_core::{EffectSelection, RenderConfig, SubtitlePosition, VisibilityWindow};
use std::path::PathBuf;

/// Word-timed karaoke subtitles from a recording and its lyrics
#[derive(Parser, Debug)]
#[command(name = "karaoke", author, version, about, long_about = None)]
pub struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: <config dir>/karaoke/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transcribe media (or load a transcript) and time the lyrics against it
    Sync(SyncArgs),
    /// Edit a timeline line by line
    Edit(EditArgs),
    /// Write a timeline as SRT or ASS, chosen by the output extension
    Export(ExportArgs),
    /// Burn karaoke subtitles into a video
    Render(RenderArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["media", "transcript"])))]
pub struct SyncArgs {
    /// Audio or video to transcribe
    #[arg(long, value_name = "FILE")]
    pub media: Option<PathBuf>,

    /// Existing recognizer output (JSON) or SRT file instead of transcribing
    #[arg(long, value_name = "FILE")]
    pub transcript: Option<PathBuf>,

    /// Lyrics to time; without them the recognized words are kept
    #[arg(long, value_name = "FILE")]
    pub lyrics: Option<PathBuf>,

    /// Use the lyrics even when they barely match what was heard
    #[arg(long, conflicts_with = "use_recognizer")]
    pub force_lyrics: bool,

    /// Keep the recognized words when the lyrics barely match
    #[arg(long)]
    pub use_recognizer: bool,

    /// Recognition model
    #[arg(long)]
    pub model: Option<String>,

    /// Spoken language code, e.g. `es`
    #[arg(long)]
    pub language: Option<String>,

    /// Similarity below which the lyrics are questioned (0.0 to 1.0)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Timeline file to write
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Timeline to edit (JSON, or SRT to import)
    pub timeline: PathBuf,

    /// Where `save` writes (default: the input file, as JSON)
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Timeline to export
    pub timeline: PathBuf,

    /// Subtitle file to write (.srt or .ass)
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,

    #[command(flatten)]
    pub style: StyleArgs,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Timeline to burn in
    pub timeline: PathBuf,

    /// Source video
    #[arg(long, value_name = "FILE")]
    pub media: PathBuf,

    /// Video to write
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,

    #[command(flatten)]
    pub style: StyleArgs,
}

/// Overrides for the configured subtitle look
#[derive(Args, Debug, Default)]
pub struct StyleArgs {
    /// Highlight effect (classic, wipe, bounce, neon, typewriter, scatter, ...)
    #[arg(long)]
    pub effect: Option<EffectSelection>,

    /// Placement: bottom, top, center or alternating
    #[arg(long)]
    pub position: Option<SubtitlePosition>,

    /// Words shown around the active one: single, compact, balanced or full
    #[arg(long)]
    pub window: Option<VisibilityWindow>,

    /// Font family
    #[arg(long)]
    pub font: Option<String>,

    /// Font size in script pixels
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Color of the active word, e.g. `#00FF00`
    #[arg(long, value_name = "COLOR")]
    pub active_color: Option<WebColor>,

    /// Color of the other words, e.g. `#FFFFFF`
    #[arg(long, value_name = "COLOR")]
    pub passive_color: Option<WebColor>,

    /// Seed for randomly placed effects
    #[arg(long)]
    pub seed: Option<u64>,
}

impl StyleArgs {
    /// Layer the flags given on the command line over `config`
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(effect) = self.effect {
            config.effect = effect;
        }
        if let Some(position) = self.position {
            config.position = position;
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        if let Some(font) = &self.font {
            config.style.font.clone_from(font);
        }
        if let Some(size) = self.font_size {
            config.style.font_size = size;
        }
        if let Some(color) = self.active_color {
            config.style.active_color = color;
        }
        if let Some(color) = self.passive_color {
            config.style.passive_color = color;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}
