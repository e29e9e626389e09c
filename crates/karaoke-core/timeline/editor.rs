//! Validated edit operations over a timeline with history
//!
//! Each operation checks its request against the current timeline, builds the
//! modified cue list, repairs it through [`refine`] and records the result.
//! A rejected request leaves both the timeline and the history untouched.

use super::{refine, History, HistoryConfig, RawCue, RawTime, Timeline};
use crate::error::{EditField, KaraokeError, Result};
use tracing::debug;

/// Text given to cues created by [`TimelineEditor::insert_at`]
pub const PLACEHOLDER_TEXT: &str = "NEW";

/// Duration of cues created by [`TimelineEditor::insert_at`]
pub const PLACEHOLDER_DURATION: f64 = 1.0;

/// Replacement values for a single cue
///
/// Times go through the same coercion as recognizer output, so a value the
/// user typed that is not a number reads as `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CueEdit {
    /// New text, trimmed before use
    pub text: String,
    /// New start time
    pub start: RawTime,
    /// New end time
    pub end: RawTime,
}

impl CueEdit {
    /// Create an edit from numeric times
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start: RawTime::Seconds(start),
            end: RawTime::Seconds(end),
        }
    }
}

/// Editing session over a timeline
#[derive(Debug, Clone)]
pub struct TimelineEditor {
    history: History,
}

impl TimelineEditor {
    /// Start editing `timeline`
    #[must_use]
    pub fn new(timeline: Timeline) -> Self {
        Self::with_config(timeline, HistoryConfig::default())
    }

    /// Start editing with a custom history depth
    #[must_use]
    pub fn with_config(timeline: Timeline, config: HistoryConfig) -> Self {
        Self {
            history: History::with_config(timeline, config),
        }
    }

    /// Current timeline
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        self.history.current()
    }

    /// Edit history
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Replace the text and times of the cue at `index`
    ///
    /// # Errors
    ///
    /// Returns [`KaraokeError::InvalidEdit`] if `index` is out of range or the
    /// new text is empty after trimming.
    pub fn edit(&mut self, index: usize, edit: CueEdit) -> Result<&Timeline> {
        let mut cues = self.cues_with(index)?;
        let text = Self::checked_text(&edit.text)?;
        cues[index] = RawCue {
            text,
            start: edit.start,
            end: edit.end,
        };
        debug!(index, "edited cue");
        Ok(self.commit(cues, format!("edit cue {index}")))
    }

    /// Replace only the text of the cue at `index`
    ///
    /// # Errors
    ///
    /// Same conditions as [`TimelineEditor::edit`].
    pub fn set_text(&mut self, index: usize, text: &str) -> Result<&Timeline> {
        let mut cues = self.cues_with(index)?;
        cues[index].text = Self::checked_text(text)?;
        Ok(self.commit(cues, format!("retext cue {index}")))
    }

    /// Remove the cue at `index`
    ///
    /// # Errors
    ///
    /// Returns [`KaraokeError::InvalidEdit`] if `index` is out of range.
    pub fn delete(&mut self, index: usize) -> Result<&Timeline> {
        let mut cues = self.cues_with(index)?;
        let removed = cues.remove(index);
        debug!(index, text = %removed.text, "deleted cue");
        Ok(self.commit(cues, format!("delete cue {index}")))
    }

    /// Insert a placeholder cue starting at `at` seconds
    ///
    /// The placeholder reads [`PLACEHOLDER_TEXT`] and lasts
    /// [`PLACEHOLDER_DURATION`] before repair; neighbours are clipped as usual.
    pub fn insert_at(&mut self, at: f64) -> &Timeline {
        let start = RawTime::Seconds(at).seconds();
        let mut cues = self.timeline().to_raw();
        cues.push(RawCue::new(
            PLACEHOLDER_TEXT,
            start,
            start + PLACEHOLDER_DURATION,
        ));
        debug!(at = start, "inserted placeholder cue");
        self.commit(cues, format!("insert cue at {start:.2}s"))
    }

    /// Step back one edit
    pub fn undo(&mut self) -> &Timeline {
        self.history.undo()
    }

    /// Reapply one undone edit
    pub fn redo(&mut self) -> &Timeline {
        self.history.redo()
    }

    /// Finish editing and keep the current timeline
    #[must_use]
    pub fn into_timeline(self) -> Timeline {
        self.history.current().clone()
    }

    fn cues_with(&self, index: usize) -> Result<Vec<RawCue>> {
        let len = self.timeline().len();
        if index >= len {
            return Err(KaraokeError::invalid_edit(
                EditField::Index,
                format!("cue {index} does not exist (timeline has {len} cues)"),
            ));
        }
        Ok(self.timeline().to_raw())
    }

    fn checked_text(text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(KaraokeError::invalid_edit(
                EditField::Text,
                "cue text cannot be empty",
            ));
        }
        Ok(trimmed.to_string())
    }

    fn commit(&mut self, cues: Vec<RawCue>, description: String) -> &Timeline {
        self.history.record(refine(cues), description)
    }
}
