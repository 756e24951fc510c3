//! Error types for playback management

use thiserror::Error;

use crate::types::{PlaybackStatus, QueueItemId};

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {index} (queue length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Queue item not present in the queue
    #[error("Queue item not found: {0}")]
    ItemNotFound(QueueItemId),

    /// Operation not allowed in the current playback status
    #[error("Operation not allowed while {0:?}")]
    InvalidState(PlaybackStatus),

    /// Platform player command failed
    #[error("Platform player error: {0}")]
    Platform(String),

    /// Media session update failed
    #[error("Media session error: {0}")]
    Session(String),

    /// Artwork could not be loaded
    #[error("Artwork error: {0}")]
    Artwork(String),

    /// The playback service has been shut down
    #[error("Playback service stopped")]
    ServiceStopped,

    /// A playback task panicked or was cancelled
    #[error("Playback task failed: {0}")]
    TaskFailed(String),
}

impl PlaybackError {
    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform(msg.into())
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    pub fn artwork(msg: impl Into<String>) -> Self {
        Self::Artwork(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
