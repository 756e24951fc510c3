//! OS media session surface
//!
//! The bridge publishes now-playing metadata for lock-screen and
//! notification controls through [`MediaSession`], and fetches artwork
//! through [`ArtworkLoader`].

use async_trait::async_trait;
use encore_core::ArtworkSize;
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{PlaybackStatus, PlaybackUiState, QueueItem, QueueItemId};

/// Raw image bytes for the media notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtworkData {
    /// Encoded image (JPEG/PNG)
    pub data: Arc<[u8]>,

    /// MIME type, e.g. "image/jpeg"
    pub mime_type: String,
}

/// Artwork shown in the notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NowPlayingArtwork {
    Image(ArtworkData),
    /// The session's built-in placeholder
    Placeholder,
}

impl NowPlayingArtwork {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, NowPlayingArtwork::Placeholder)
    }
}

/// Metadata published to the OS media session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlaying {
    pub item_id: QueueItemId,
    pub title: String,
    /// Artist names joined with the configured separator
    pub artist: String,
    pub artwork: NowPlayingArtwork,
    pub duration_ms: u64,
    pub status: PlaybackStatus,
    pub explicit: bool,
}

impl NowPlaying {
    pub(crate) fn from_state(
        item: &QueueItem,
        state: &PlaybackUiState,
        artwork: NowPlayingArtwork,
        separator: &str,
    ) -> Self {
        let track = item.track();
        Self {
            item_id: item.id(),
            title: track.title().to_string(),
            artist: track.artist_names(separator),
            artwork,
            duration_ms: state.duration_ms,
            status: state.status,
            explicit: track.is_explicit(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// OS media session / media notification
#[async_trait]
pub trait MediaSession: Send {
    /// Show or update the ongoing now-playing presentation
    async fn publish(&mut self, now_playing: &NowPlaying) -> Result<()>;

    /// Remove the ongoing presentation (nothing is playing any more)
    async fn clear(&mut self) -> Result<()>;
}

/// Fetches artwork bytes for a URI
#[async_trait]
pub trait ArtworkLoader: Send + Sync {
    async fn load(&self, uri: &str) -> Result<ArtworkData>;

    /// Resolution requested for the notification
    fn preferred_size(&self) -> ArtworkSize {
        ArtworkSize::Big
    }
}

#[async_trait]
impl<T: ArtworkLoader + ?Sized> ArtworkLoader for Arc<T> {
    async fn load(&self, uri: &str) -> Result<ArtworkData> {
        (**self).load(uri).await
    }

    fn preferred_size(&self) -> ArtworkSize {
        (**self).preferred_size()
    }
}

/// Loader that never fetches; every track gets the placeholder
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArtwork;

#[async_trait]
impl ArtworkLoader for NoArtwork {
    async fn load(&self, uri: &str) -> Result<ArtworkData> {
        Err(crate::error::PlaybackError::artwork(format!(
            "artwork loading disabled ({uri})"
        )))
    }
}
