//! Error types for timeline decoding, import and playback

use thiserror::Error;

/// Convenient result alias for timeline operations.
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Errors surfaced by the timeline core.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Bullet path does not have the `Bullets/{Axis}_{from}_{to}/{Kind}` shape
    #[error("malformed bullet path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// Time string is not `MM:SS:mmm`
    #[error("invalid time format '{0}', expected MM:SS:mmm")]
    InvalidTimeFormat(String),

    /// Level document is structurally wrong or references an unknown song
    #[error("malformed level document: {0}")]
    MalformedDocument(String),

    /// A required collaborator (clock, spawner) has not been wired
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Reading or writing a level/settings file failed
    #[error("failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TimelineError {
    /// Creates a malformed path error
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        TimelineError::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed document error
    pub fn malformed_document(reason: impl Into<String>) -> Self {
        TimelineError::MalformedDocument(reason.into())
    }

    /// Creates an I/O error tagged with the file it concerns
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        TimelineError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        TimelineError::MalformedDocument(err.to_string())
    }
}
