//! Decide whether user lyrics may replace the recognized words

use crate::text::{normalized_phrase, similarity, tokenize};
use crate::timeline::WordCue;
use tracing::debug;

/// Outcome of scoring lyrics against a recognized transcript
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// No lyrics were supplied; keep the recognizer's words
    UseRecognizer,
    /// Lyrics match closely enough to align automatically
    UseLyrics { ratio: f64 },
    /// Similarity is below the threshold; someone has to choose
    Ambiguous { ratio: f64 },
}

impl GateDecision {
    /// Similarity score, if lyrics were scored at all
    #[must_use]
    pub const fn ratio(&self) -> Option<f64> {
        match self {
            Self::UseRecognizer => None,
            Self::UseLyrics { ratio } | Self::Ambiguous { ratio } => Some(*ratio),
        }
    }
}

/// Similarity threshold check between transcript and lyrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityGate {
    threshold: f64,
}

impl Default for SimilarityGate {
    fn default() -> Self {
        Self::new(super::DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl SimilarityGate {
    /// Gate with `threshold` in `[0, 1]`; ratios strictly below it are ambiguous
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Threshold in use
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Character-level similarity of the normalized transcript and lyrics
    #[must_use]
    pub fn score(recognized: &[WordCue], lyrics_tokens: &[&str]) -> f64 {
        let transcript = normalized_phrase(recognized.iter().map(|cue| cue.text.as_str()));
        let lyrics = normalized_phrase(lyrics_tokens.iter().copied());
        similarity(&transcript, &lyrics)
    }

    /// Score `lyrics` against `recognized` and classify the result
    #[must_use]
    pub fn evaluate(&self, recognized: &[WordCue], lyrics: &str) -> GateDecision {
        let tokens = tokenize(lyrics);
        if tokens.is_empty() {
            return GateDecision::UseRecognizer;
        }

        let ratio = Self::score(recognized, &tokens);
        debug!(
            ratio,
            threshold = self.threshold,
            recognized = recognized.len(),
            lyrics = tokens.len(),
            "scored lyrics"
        );

        if ratio < self.threshold {
            GateDecision::Ambiguous { ratio }
        } else {
            GateDecision::UseLyrics { ratio }
        }
    }
}
