//! Platform player boundary
//!
//! Abstracts the audio engine of the host platform (Android `MediaPlayer`,
//! AVPlayer, a desktop decoder, a simulation). Implementations report
//! asynchronous outcomes through the [`PlatformEventSender`] they receive
//! when the service starts.
//!
//! [`PlatformEventSender`]: crate::events::PlatformEventSender

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{QueueItem, QueueItemId};

/// Media to load into the platform player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    /// Queue item the media belongs to; echo it back in every event
    pub item_id: QueueItemId,

    /// Load generation of the item; echo it back in every event too
    pub generation: u64,

    /// Preview locator (URI)
    pub locator: String,

    /// Expected duration from catalog metadata
    pub duration_ms: Option<u64>,
}

impl MediaSource {
    pub fn from_item(item: &QueueItem, generation: u64) -> Self {
        Self {
            item_id: item.id(),
            generation,
            locator: item.locator().to_string(),
            duration_ms: item.track().duration_ms(),
        }
    }
}

/// Platform audio player
///
/// Only the media-session bridge calls these methods; it owns the player
/// exclusively. `load` and `prepare` return once the request is accepted,
/// readiness is signalled later with `PlatformEvent::Prepared`.
#[async_trait]
pub trait PlatformPlayer: Send {
    /// Set the data source, replacing anything previously loaded
    async fn load(&mut self, media: &MediaSource) -> Result<()>;

    /// Start asynchronous preparation of the loaded source
    async fn prepare(&mut self) -> Result<()>;

    /// Start or resume playback
    async fn play(&mut self) -> Result<()>;

    /// Pause, keeping the position
    async fn pause(&mut self) -> Result<()>;

    /// Seek within the loaded source
    async fn seek(&mut self, position_ms: u64) -> Result<()>;

    /// Stop and unload the current source
    async fn stop(&mut self) -> Result<()>;

    /// Release all platform resources; the player is unusable afterwards
    async fn release(&mut self);

    /// Whether audio is actually playing right now
    fn is_playing(&self) -> bool;

    /// Current position in the loaded source
    fn position_ms(&self) -> u64;
}
