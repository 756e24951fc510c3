/// Core error types for Encore
use thiserror::Error;

use crate::types::TrackId;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Encore
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A track must credit at least one artist
    #[error("Track {0} has no artists")]
    MissingArtist(TrackId),

    /// Track title is blank
    #[error("Track {0} has an empty title")]
    EmptyTitle(TrackId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
