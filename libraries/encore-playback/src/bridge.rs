//! Media session bridge
//!
//! Keeps the platform player and the OS media session in line with the
//! latest [`PlaybackUiState`]. The bridge is the only caller of the
//! [`PlatformPlayer`]; it reads state and never writes it. Command failures
//! are reported back to the manager as [`PlatformEvent::Error`].

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::PlaybackError,
    events::{PlatformEvent, PlatformEventSender, PLATFORM_COMMAND_FAILED},
    platform::{MediaSource, PlatformPlayer},
    session::{ArtworkLoader, MediaSession, NowPlaying, NowPlayingArtwork},
    types::{PlaybackConfig, PlaybackStatus, PlaybackUiState, QueueItem, QueueItemId},
};

/// Identity of the media currently loaded in the platform player
#[derive(Debug, Clone, PartialEq, Eq)]
struct LoadedMedia {
    item_id: QueueItemId,
    locator: String,
    generation: u64,
}

impl LoadedMedia {
    fn of(item: &QueueItem, state: &PlaybackUiState) -> Self {
        Self {
            item_id: item.id(),
            locator: item.locator().to_string(),
            generation: state.load_generation,
        }
    }
}

/// Reconciles platform player and media session against playback state
pub struct MediaSessionBridge<P, S, A> {
    player: P,
    session: S,
    artwork: A,
    events: PlatformEventSender,

    seek_tolerance_ms: u64,
    artist_separator: String,

    loaded: Option<LoadedMedia>,
    applied_seek: Option<u64>,
    published: Option<NowPlaying>,
    // Last artwork fetched, keyed by URI
    artwork_cache: Option<(String, NowPlayingArtwork)>,
}

impl<P, S, A> MediaSessionBridge<P, S, A>
where
    P: PlatformPlayer,
    S: MediaSession,
    A: ArtworkLoader,
{
    pub fn new(
        config: &PlaybackConfig,
        player: P,
        session: S,
        artwork: A,
        events: PlatformEventSender,
    ) -> Self {
        Self {
            player,
            session,
            artwork,
            events,
            seek_tolerance_ms: config.seek_tolerance_ms,
            artist_separator: config.artist_separator.clone(),
            loaded: None,
            applied_seek: None,
            published: None,
            artwork_cache: None,
        }
    }

    /// Follow `states` until the publisher goes away, then tear down
    ///
    /// Each state is reconciled completely before the next one is looked at;
    /// states published in the meantime collapse into the latest.
    pub async fn run(mut self, mut states: watch::Receiver<PlaybackUiState>) {
        info!("Media session bridge started");

        loop {
            let state = states.borrow_and_update().clone();
            self.reconcile(&state).await;

            if states.changed().await.is_err() {
                break;
            }
        }

        self.teardown().await;
        info!("Media session bridge stopped");
    }

    /// Bring the player and the session in line with `state`
    pub async fn reconcile(&mut self, state: &PlaybackUiState) {
        let Some(item) = state
            .current_item
            .as_ref()
            .filter(|_| state.status != PlaybackStatus::Idle)
        else {
            self.unload().await;
            self.clear_session().await;
            return;
        };

        if state.status == PlaybackStatus::Errored {
            // Forget the media so a retry loads it again
            self.unload().await;
            self.publish_now_playing(item, state).await;
            return;
        }

        let wanted = LoadedMedia::of(item, state);
        if self.loaded.as_ref() != Some(&wanted) {
            if let Err(e) = self.load(item, state.load_generation).await {
                self.report_failure(item.id(), state.load_generation, &e).await;
                return;
            }
            self.loaded = Some(wanted);
            // Seeks issued before this load belong to other media
            self.applied_seek = state.seek_request.map(|seek| seek.serial);
        }

        if matches!(
            state.status,
            PlaybackStatus::Playing | PlaybackStatus::Paused
        ) {
            if let Err(e) = self.sync_transport(state).await {
                self.report_failure(item.id(), state.load_generation, &e).await;
                return;
            }
        }

        self.publish_now_playing(item, state).await;
    }

    async fn load(&mut self, item: &QueueItem, generation: u64) -> crate::error::Result<()> {
        let media = MediaSource::from_item(item, generation);
        debug!(item = %media.item_id, generation, locator = %media.locator, "Loading media");

        self.player.load(&media).await?;
        self.player.prepare().await
    }

    async fn sync_transport(&mut self, state: &PlaybackUiState) -> crate::error::Result<()> {
        let platform_position = self.player.position_ms();

        match state.seek_request {
            Some(seek) if self.applied_seek != Some(seek.serial) => {
                debug!(serial = seek.serial, position_ms = seek.position_ms, "Applying seek");
                self.applied_seek = Some(seek.serial);
                self.player.seek(seek.position_ms).await?;
            }
            _ if platform_position.abs_diff(state.position_ms) > self.seek_tolerance_ms => {
                debug!(
                    platform = platform_position,
                    state = state.position_ms,
                    "Position drift, re-seeking"
                );
                self.player.seek(state.position_ms).await?;
            }
            _ => {}
        }

        let should_play = state.is_playing();
        if should_play != self.player.is_playing() {
            if should_play {
                debug!("Starting platform playback");
                self.player.play().await?;
            } else {
                debug!("Pausing platform playback");
                self.player.pause().await?;
            }
        }
        Ok(())
    }

    async fn unload(&mut self) {
        if let Some(media) = self.loaded.take() {
            debug!(item = %media.item_id, "Stopping platform player");
            if let Err(e) = self.player.stop().await {
                warn!(error = %e, "Platform stop failed");
            }
        }
    }

    async fn clear_session(&mut self) {
        if self.published.take().is_some() {
            debug!("Clearing media session");
            if let Err(e) = self.session.clear().await {
                warn!(error = %e, "Media session clear failed");
            }
        }
    }

    async fn publish_now_playing(&mut self, item: &QueueItem, state: &PlaybackUiState) {
        let artwork = self.artwork_for(item).await;
        let now_playing = NowPlaying::from_state(item, state, artwork, &self.artist_separator);

        if self.published.as_ref() == Some(&now_playing) {
            return;
        }

        debug!(item = %now_playing.item_id, status = ?now_playing.status, "Publishing now playing");
        if let Err(e) = self.session.publish(&now_playing).await {
            warn!(error = %e, "Media session publish failed");
        }
        self.published = Some(now_playing);
    }

    async fn artwork_for(&mut self, item: &QueueItem) -> NowPlayingArtwork {
        let Some(uri) = item.track().artwork().best(self.artwork.preferred_size()) else {
            return NowPlayingArtwork::Placeholder;
        };

        if let Some((cached_uri, artwork)) = &self.artwork_cache {
            if cached_uri == uri {
                return artwork.clone();
            }
        }

        let artwork = match self.artwork.load(uri).await {
            Ok(data) => NowPlayingArtwork::Image(data),
            Err(e) => {
                warn!(uri, error = %e, "Artwork unavailable, using placeholder");
                NowPlayingArtwork::Placeholder
            }
        };
        self.artwork_cache = Some((uri.to_string(), artwork.clone()));
        artwork
    }

    async fn report_failure(&mut self, item_id: QueueItemId, generation: u64, error: &PlaybackError) {
        warn!(item = %item_id, generation, error = %error, "Platform command failed");
        self.loaded = None;

        let event = PlatformEvent::Error {
            item_id,
            generation,
            code: PLATFORM_COMMAND_FAILED,
            message: error.to_string(),
        };
        if self.events.send(event).await.is_err() {
            debug!("Manager gone, failure not reported");
        }
    }

    async fn teardown(&mut self) {
        self.unload().await;
        self.player.release().await;
        self.clear_session().await;
        self.artwork_cache = None;
    }
}
