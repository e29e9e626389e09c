//! Transfer recognizer timing onto user-supplied lyrics
//!
//! The recognized words and the lyrics are diffed word by word on their
//! normalized forms. Matching words inherit the recognizer's timing, replaced
//! runs share the time span of the words they replace, and extra lyrics are
//! laid out after the last emitted cue. Recognized words without a lyric
//! counterpart are dropped.

use crate::text::{normalize, AlignmentOpcode, SequenceMatcher};
use crate::timeline::WordCue;
use tracing::trace;

/// Word-level aligner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aligner {
    insertion_duration: f64,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(super::DEFAULT_INSERTION_DURATION)
    }
}

impl Aligner {
    /// Aligner giving each unmatched lyric `insertion_duration` seconds
    #[must_use]
    pub const fn new(insertion_duration: f64) -> Self {
        Self { insertion_duration }
    }

    /// Time each lyric token using the recognized words
    ///
    /// The result keeps the tokens' original text and order but is not
    /// repaired; pass it through [`crate::timeline::refine`] before use.
    pub fn align<S: AsRef<str>>(&self, recognized: &[WordCue], lyrics: &[S]) -> Vec<WordCue> {
        let recognized_norm: Vec<String> =
            recognized.iter().map(|cue| normalize(&cue.text)).collect();
        let lyrics_norm: Vec<String> = lyrics.iter().map(|token| normalize(token.as_ref())).collect();

        let mut aligned: Vec<WordCue> = Vec::with_capacity(lyrics.len());
        for opcode in SequenceMatcher::new(&recognized_norm, &lyrics_norm).opcodes() {
            trace!(
                op = opcode.tag(),
                source = ?opcode.source(),
                target = ?opcode.target(),
                "alignment step"
            );
            match opcode {
                AlignmentOpcode::Equal { source, target } => {
                    for (i, j) in source.zip(target) {
                        aligned.push(WordCue::new(
                            lyrics[j].as_ref(),
                            recognized[i].start,
                            recognized[i].end,
                        ));
                    }
                }
                AlignmentOpcode::Replace { source, target } if !source.is_empty() => {
                    let span_start = recognized[source.start].start;
                    let span_end = recognized[source.end - 1].end;
                    #[allow(clippy::cast_precision_loss)]
                    let step = (span_end - span_start) / target.len() as f64;
                    for (k, j) in target.enumerate() {
                        #[allow(clippy::cast_precision_loss)]
                        let offset = k as f64;
                        aligned.push(WordCue::new(
                            lyrics[j].as_ref(),
                            span_start + offset * step,
                            span_start + (offset + 1.0) * step,
                        ));
                    }
                }
                AlignmentOpcode::Replace { target, .. } | AlignmentOpcode::Insert { target, .. } => {
                    let mut cursor = aligned.last().map_or(0.0, |cue| cue.end);
                    for j in target {
                        aligned.push(WordCue::new(
                            lyrics[j].as_ref(),
                            cursor,
                            cursor + self.insertion_duration,
                        ));
                        cursor += self.insertion_duration;
                    }
                }
                AlignmentOpcode::Delete { .. } => {}
            }
        }

        aligned
    }
}
