//! Error types for the karaoke-core crate
//!
//! Only two failure classes escape the pipeline: edit requests that reference
//! something that does not exist (or would break the timeline), and failures
//! of the slow external collaborators (recognition, encoding). Everything else
//! degrades to a valid value instead of failing.

use core::fmt;
use thiserror::Error;

/// Field of an edit request that was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    /// Cue index does not exist in the timeline
    Index,
    /// Cue text is empty after trimming
    Text,
}

impl EditField {
    /// Lowercase name used in messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for karaoke-core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KaraokeError {
    /// Edit request rejected before any mutation took place
    #[error("Invalid edit ({field}): {message}")]
    InvalidEdit { field: EditField, message: String },

    /// Recognition or encoding process failed
    #[error("{collaborator} failed: {detail}")]
    CollaboratorFailure {
        collaborator: String,
        detail: String,
    },

    /// A request is already in flight on this worker
    #[error("{collaborator} is already running a request")]
    CollaboratorBusy { collaborator: String },

    /// The request was cancelled through its token
    #[error("{collaborator} was cancelled")]
    Cancelled { collaborator: String },

    /// Color string is not `#RRGGBB`
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Import/export I/O failure
    #[error("IO error: {0}")]
    Io(String),

    /// Input file could not be understood
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl KaraokeError {
    /// Create a new invalid edit error
    pub fn invalid_edit<T: fmt::Display>(field: EditField, message: T) -> Self {
        Self::InvalidEdit {
            field,
            message: message.to_string(),
        }
    }

    /// Create a new collaborator failure carrying the underlying failure text
    pub fn collaborator<C: fmt::Display, T: fmt::Display>(collaborator: C, detail: T) -> Self {
        Self::CollaboratorFailure {
            collaborator: collaborator.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Create a new IO error
    pub fn io<T: fmt::Display>(message: T) -> Self {
        Self::Io(message.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(message: T) -> Self {
        Self::InvalidConfig(message.to_string())
    }

    /// Check if the pipeline stays usable after this error
    ///
    /// Every error leaves the in-memory timeline untouched, so only
    /// configuration errors require the caller to change something first.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }

    /// Check if this error rejected an edit request
    #[must_use]
    pub const fn is_edit_error(&self) -> bool {
        matches!(self, Self::InvalidEdit { .. })
    }

    /// Check if this error came from an external collaborator
    #[must_use]
    pub const fn is_collaborator_error(&self) -> bool {
        matches!(
            self,
            Self::CollaboratorFailure { .. } | Self::CollaboratorBusy { .. } | Self::Cancelled { .. }
        )
    }

    /// Field that failed, for edit errors
    #[must_use]
    pub const fn edit_field(&self) -> Option<EditField> {
        match self {
            Self::InvalidEdit { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KaraokeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for karaoke-core operations
pub type Result<T> = core::result::Result<T, KaraokeError>;
