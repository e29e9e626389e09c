//! Lyrics synchronization
//!
//! Turns a recognized transcript plus optional user lyrics into the timeline
//! that gets edited and exported:
//!
//! 1. the recognizer output is repaired with [`refine`]
//! 2. the [`SimilarityGate`] scores the lyrics against it
//! 3. an ambiguous score is settled by an [`AmbiguityResolver`]
//! 4. accepted lyrics are timed by the [`Aligner`] and repaired again

pub mod align;
pub mod gate;

pub use align::Aligner;
pub use gate::{GateDecision, SimilarityGate};

use crate::error::{KaraokeError, Result};
use crate::text::tokenize;
use crate::timeline::{refine, RawCue, Timeline};
use core::fmt;
use tracing::{info, warn};

/// Similarity below which lyrics need confirmation
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.40;

/// Seconds given to each lyric with no recognized counterpart
pub const DEFAULT_INSERTION_DURATION: f64 = 0.5;

/// Tunables for the synchronization step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncPolicy {
    /// Gate threshold in `[0, 1]`
    pub similarity_threshold: f64,
    /// Duration of synthesized cues, in seconds
    pub insertion_duration: f64,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            insertion_duration: DEFAULT_INSERTION_DURATION,
        }
    }
}

impl SyncPolicy {
    /// Check the values are usable
    ///
    /// # Errors
    ///
    /// Returns [`KaraokeError::InvalidConfig`] for a threshold outside
    /// `[0, 1]` or a non-positive insertion duration.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(KaraokeError::config(format!(
                "similarity_threshold must be within 0..=1, got {}",
                self.similarity_threshold
            )));
        }
        if !(self.insertion_duration.is_finite() && self.insertion_duration > 0.0) {
            return Err(KaraokeError::config(format!(
                "insertion_duration must be positive, got {}",
                self.insertion_duration
            )));
        }
        Ok(())
    }
}

/// Where the words of the final timeline came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingSource {
    /// Recognizer words as heard
    Recognizer,
    /// User lyrics aligned automatically
    Lyrics,
    /// User lyrics aligned after an ambiguous score was overridden
    ForcedLyrics,
}

impl fmt::Display for TimingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recognizer => "recognizer",
            Self::Lyrics => "lyrics",
            Self::ForcedLyrics => "forced lyrics",
        })
    }
}

/// Answer to an ambiguous similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResolution {
    /// Align the lyrics anyway
    ForceLyrics,
    /// Keep the recognizer's words
    UseRecognizer,
}

/// Decides what to do when lyrics and transcript disagree
///
/// Interactive front ends ask the user; batch callers usually answer with a
/// fixed [`SyncResolution`].
pub trait AmbiguityResolver {
    /// Choose how to proceed for a similarity `ratio` below the threshold
    fn resolve(&self, ratio: f64) -> SyncResolution;
}

impl AmbiguityResolver for SyncResolution {
    fn resolve(&self, _ratio: f64) -> SyncResolution {
        *self
    }
}

impl<F> AmbiguityResolver for F
where
    F: Fn(f64) -> SyncResolution,
{
    fn resolve(&self, ratio: f64) -> SyncResolution {
        self(ratio)
    }
}

/// Result of a synchronization run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    /// Repaired timeline ready for editing
    pub timeline: Timeline,
    /// Origin of the words in `timeline`
    pub source: TimingSource,
    /// Similarity score when lyrics were supplied
    pub ratio: Option<f64>,
}

/// Recognizer output plus lyrics to timeline
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncPipeline {
    gate: SimilarityGate,
    aligner: Aligner,
}

impl SyncPipeline {
    /// Pipeline using `policy`
    #[must_use]
    pub const fn new(policy: SyncPolicy) -> Self {
        Self {
            gate: SimilarityGate::new(policy.similarity_threshold),
            aligner: Aligner::new(policy.insertion_duration),
        }
    }

    /// Build the timeline for `recognized` and optional `lyrics`
    ///
    /// Blank lyrics keep the recognized words. The resolver is consulted only
    /// when the gate reports an ambiguous score.
    pub fn run<I>(
        &self,
        recognized: I,
        lyrics: &str,
        resolver: &dyn AmbiguityResolver,
    ) -> SyncOutcome
    where
        I: IntoIterator<Item = RawCue>,
    {
        let heard = refine(recognized);
        let decision = self.gate.evaluate(heard.cues(), lyrics);

        let source = match decision {
            GateDecision::UseRecognizer => TimingSource::Recognizer,
            GateDecision::UseLyrics { .. } => TimingSource::Lyrics,
            GateDecision::Ambiguous { ratio } => match resolver.resolve(ratio) {
                SyncResolution::ForceLyrics => {
                    warn!(ratio, "lyrics forced despite low similarity");
                    TimingSource::ForcedLyrics
                }
                SyncResolution::UseRecognizer => {
                    info!(ratio, "lyrics rejected, keeping recognized words");
                    TimingSource::Recognizer
                }
            },
        };

        let timeline = if source == TimingSource::Recognizer {
            heard
        } else {
            let tokens = tokenize(lyrics);
            let aligned = self.aligner.align(heard.cues(), &tokens);
            refine(aligned.into_iter().map(RawCue::from))
        };

        info!(
            cues = timeline.len(),
            %source,
            ratio = decision.ratio(),
            "synchronized timeline"
        );

        SyncOutcome {
            timeline,
            source,
            ratio: decision.ratio(),
        }
    }
}

/// Parse recognizer JSON into raw cues
///
/// Accepts either a flat array of `{text|word, start, end}` objects or the
/// segment layout `{"segments": [{"words": [...]}, ...]}`. Unknown fields
/// are ignored and malformed times are kept for [`refine`] to coerce.
///
/// # Errors
///
/// Returns [`KaraokeError::InvalidFormat`] if the document matches neither
/// layout.
#[cfg(feature = "serde")]
pub fn parse_recognizer_json(json: &str) -> Result<Vec<RawCue>> {
    #[derive(serde::Deserialize)]
    struct Segment {
        #[serde(default)]
        words: Vec<RawCue>,
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Document {
        Words(Vec<RawCue>),
        Segments { segments: Vec<Segment> },
    }

    let document: Document = serde_json::from_str(json)
        .map_err(|err| KaraokeError::InvalidFormat(format!("recognizer output: {err}")))?;

    Ok(match document {
        Document::Words(words) => words,
        Document::Segments { segments } => segments
            .into_iter()
            .flat_map(|segment| segment.words)
            .collect(),
    })
}
