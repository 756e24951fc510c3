use encore_catalog::CatalogError;
use encore_playback::PlaybackError;
use thiserror::Error;

/// Headless player errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nothing to play: {0}")]
    NothingToPlay(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
