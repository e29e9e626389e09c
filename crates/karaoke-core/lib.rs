//! # Karaoke Core
//!
//! Word-level timing pipeline for karaoke subtitles. Takes the timed words a
//! speech recognizer heard, optionally swaps in user-supplied lyrics while
//! keeping the recognizer's timing, lets the result be edited with undo/redo,
//! and renders it as SRT or as an animated ASS script.
//!
//! ## Pipeline
//!
//! - [`timeline`]: word cues, the repair pass, history and editing
//! - [`text`]: normalization and Ratcliff/Obershelp matching
//! - [`sync`]: similarity gate, lyric alignment and the combined pipeline
//! - [`subtitle`]: visibility windows, effects, ASS/SRT output
//! - [`collab`]: recognizer/encoder seams and background workers
//!
//! ## Quick Start
//!
//! ```rust
//! use karaoke_core::sync::{SyncPipeline, SyncResolution};
//! use karaoke_core::subtitle::{render_ass, RenderConfig};
//! use karaoke_core::timeline::RawCue;
//!
//! let heard = vec![
//!     RawCue::new("hello", 0.0, 0.5),
//!     RawCue::new("wurld", 0.6, 1.0),
//! ];
//! let outcome = SyncPipeline::default().run(heard, "Hello, world!", &SyncResolution::UseRecognizer);
//! assert_eq!(outcome.timeline.cues()[1].text, "world!");
//!
//! let script = render_ass(&outcome.timeline, &RenderConfig::default());
//! assert!(script.contains("Dialogue: 0,0:00:00.60,0:00:01.00,Default"));
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod collab;
pub mod config;
pub mod error;
pub mod subtitle;
pub mod sync;
pub mod text;
pub mod timeline;

pub use config::KaraokeConfig;
pub use error::{EditField, KaraokeError, Result};
pub use subtitle::{EffectSelection, RenderConfig, SubtitleFormat, SubtitlePosition, VisibilityWindow};
pub use sync::{SyncOutcome, SyncPipeline, SyncPolicy, SyncResolution, TimingSource};
pub use timeline::{refine, CueEdit, History, RawCue, Timeline, TimelineEditor, WordCue};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
