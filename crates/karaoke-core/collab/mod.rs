//! Boundary to the slow external collaborators
//!
//! Speech recognition and video encoding run outside the pipeline, usually as
//! separate processes. This module defines what the pipeline asks of them
//! ([`Recognizer`], [`Encoder`]), how a request is cancelled
//! ([`CancellationToken`]) and how a request runs off the caller's thread
//! ([`CollaboratorWorker`]). Results come back as owned values; no timeline
//! data is shared between threads.

pub mod cache;
pub mod worker;

pub use cache::{CachedRecognizer, ResourceCache};
pub use worker::{CollaboratorWorker, PendingTask};

use crate::error::Result;
use crate::timeline::{RawCue, Timeline};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static_assertions::assert_impl_all!(Timeline: Send, Sync);
static_assertions::assert_impl_all!(Transcript: Send, Sync);
static_assertions::assert_impl_all!(CancellationToken: Send, Sync, Clone);

/// Shared flag asking a running request to stop
///
/// Clones observe the same flag. Collaborators check it between units of
/// work; a cancelled request reports [`crate::KaraokeError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, uncancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this token to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Parameters of one recognition run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecognitionRequest {
    /// Audio or video file to transcribe
    pub media: PathBuf,
    /// Recognition model name, e.g. `small`
    pub model: String,
    /// Spoken language code; `None` lets the recognizer detect it
    pub language: Option<String>,
}

impl RecognitionRequest {
    /// Request for `media` with `model` and language detection
    pub fn new(media: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            media: media.into(),
            model: model.into(),
            language: None,
        }
    }

    /// Fix the spoken language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Recognizer output, not yet refined
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    /// Timed words in recognizer order
    pub words: Vec<RawCue>,
    /// Language the recognizer reported, if any
    pub language: Option<String>,
}

impl Transcript {
    /// Transcript from raw words
    #[must_use]
    pub fn new(words: Vec<RawCue>) -> Self {
        Self {
            words,
            language: None,
        }
    }
}

/// Parameters of one burn-in render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Source video
    pub media: PathBuf,
    /// ASS script to burn in
    pub subtitles: PathBuf,
    /// Output video
    pub output: PathBuf,
}

/// Speech recognizer producing timed words
pub trait Recognizer: Send + Sync {
    /// Short name used in errors and logs
    fn name(&self) -> &str;

    /// Transcribe `request.media`
    ///
    /// # Errors
    ///
    /// Returns [`crate::KaraokeError::CollaboratorFailure`] carrying the
    /// underlying failure text, or [`crate::KaraokeError::Cancelled`].
    fn recognize(&self, request: &RecognitionRequest, cancel: &CancellationToken) -> Result<Transcript>;
}

/// Video encoder burning a subtitle script into a video
pub trait Encoder: Send + Sync {
    /// Short name used in errors and logs
    fn name(&self) -> &str;

    /// Produce `job.output`
    ///
    /// # Errors
    ///
    /// Returns [`crate::KaraokeError::CollaboratorFailure`] carrying the
    /// underlying failure text, or [`crate::KaraokeError::Cancelled`].
    fn encode(&self, job: &RenderJob, cancel: &CancellationToken) -> Result<()>;
}

impl<R: Recognizer + ?Sized> Recognizer for Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, request: &RecognitionRequest, cancel: &CancellationToken) -> Result<Transcript> {
        (**self).recognize(request, cancel)
    }
}

impl<E: Encoder + ?Sized> Encoder for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn encode(&self, job: &RenderJob, cancel: &CancellationToken) -> Result<()> {
        (**self).encode(job, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn request_builder() {
        let request = RecognitionRequest::new("song.mp3", "small").with_language("es");
        assert_eq!(request.model, "small");
        assert_eq!(request.language.as_deref(), Some("es"));
    }
}
