//! Shared fakes for the playback integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use encore_core::{ArtistRef, Artwork, Track, TrackId};
use encore_playback::{
    ArtworkData, ArtworkLoader, MediaSession, MediaSource, NowPlaying, PlatformEvent,
    PlatformEventSender, PlatformPlayer, PlaybackError, PlaybackUiState, QueueItemId, Result,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

pub const WAIT: Duration = Duration::from_secs(2);

pub fn create_test_track(id: u64) -> Arc<Track> {
    Arc::new(
        Track::builder(TrackId::new(id), format!("Track {id}"))
            .artist(ArtistRef::new(100 + id, format!("Artist {id}")))
            .duration_ms(30_000)
            .artwork(Artwork::default().with_big(format!("https://img.example.com/{id}.jpg")))
            .preview(format!("https://cdn.example.com/{id}.mp3"))
            .build()
            .unwrap(),
    )
}

pub fn locator(id: u64) -> String {
    format!("https://cdn.example.com/{id}.mp3")
}

/// Wait until the published state satisfies `predicate`
pub async fn wait_for_state(
    states: &mut watch::Receiver<PlaybackUiState>,
    predicate: impl FnMut(&PlaybackUiState) -> bool,
) -> PlaybackUiState {
    tokio::time::timeout(WAIT, states.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed")
        .clone()
}

/// Poll `condition` until it holds
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// ===== Platform player =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Load(String),
    Prepare,
    Play,
    Pause,
    Seek(u64),
    Stop,
    Release,
}

/// Test-side view of a [`FakePlayer`]
#[derive(Clone, Default)]
pub struct PlayerProbe {
    calls: Arc<Mutex<Vec<PlayerCall>>>,
    // Locators whose preparation reports an error
    failing_prepare: Arc<Mutex<HashSet<String>>>,
    // Locators whose load command itself fails
    failing_load: Arc<Mutex<HashSet<String>>>,
    events: Arc<Mutex<Option<PlatformEventSender>>>,
    loaded: Arc<Mutex<Option<QueueItemId>>>,
}

impl PlayerProbe {
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &PlayerCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlayerCall::Load(locator) => Some(locator),
                _ => None,
            })
            .collect()
    }

    pub fn fail_prepare(&self, locator: &str) {
        self.failing_prepare
            .lock()
            .unwrap()
            .insert(locator.to_string());
    }

    pub fn heal(&self, locator: &str) {
        self.failing_prepare.lock().unwrap().remove(locator);
        self.failing_load.lock().unwrap().remove(locator);
    }

    pub fn fail_load(&self, locator: &str) {
        self.failing_load.lock().unwrap().insert(locator.to_string());
    }

    pub fn loaded_item(&self) -> Option<QueueItemId> {
        *self.loaded.lock().unwrap()
    }

    /// Emit an event as if the platform produced it
    pub async fn emit(&self, event: PlatformEvent) {
        let sender = self.events.lock().unwrap().clone();
        sender.expect("player not started").send(event).await.unwrap();
    }
}

/// Recording platform player; prepares instantly unless told to fail
pub struct FakePlayer {
    probe: PlayerProbe,
    events: PlatformEventSender,
    media: Option<MediaSource>,
    playing: bool,
    position_ms: u64,
}

impl FakePlayer {
    pub fn new(probe: &PlayerProbe, events: PlatformEventSender) -> Self {
        *probe.events.lock().unwrap() = Some(events.clone());
        Self {
            probe: probe.clone(),
            events,
            media: None,
            playing: false,
            position_ms: 0,
        }
    }

    fn record(&self, call: PlayerCall) {
        self.probe.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlatformPlayer for FakePlayer {
    async fn load(&mut self, media: &MediaSource) -> Result<()> {
        self.record(PlayerCall::Load(media.locator.clone()));
        if self.probe.failing_load.lock().unwrap().contains(&media.locator) {
            return Err(PlaybackError::platform("unsupported locator"));
        }
        self.media = Some(media.clone());
        self.playing = false;
        self.position_ms = 0;
        *self.probe.loaded.lock().unwrap() = Some(media.item_id);
        Ok(())
    }

    async fn prepare(&mut self) -> Result<()> {
        self.record(PlayerCall::Prepare);
        let Some(media) = self.media.clone() else {
            return Err(PlaybackError::platform("nothing loaded"));
        };

        let failing = self
            .probe
            .failing_prepare
            .lock()
            .unwrap()
            .contains(&media.locator);
        let event = if failing {
            PlatformEvent::Error {
                item_id: media.item_id,
                generation: media.generation,
                code: 404,
                message: "preview not found".to_string(),
            }
        } else {
            PlatformEvent::Prepared {
                item_id: media.item_id,
                generation: media.generation,
                duration_ms: media.duration_ms,
            }
        };
        self.events.send(event).await
    }

    async fn play(&mut self) -> Result<()> {
        self.record(PlayerCall::Play);
        self.playing = true;
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.record(PlayerCall::Pause);
        self.playing = false;
        Ok(())
    }

    async fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.record(PlayerCall::Seek(position_ms));
        self.position_ms = position_ms;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.record(PlayerCall::Stop);
        self.media = None;
        self.playing = false;
        self.position_ms = 0;
        *self.probe.loaded.lock().unwrap() = None;
        Ok(())
    }

    async fn release(&mut self) {
        self.record(PlayerCall::Release);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn position_ms(&self) -> u64 {
        self.position_ms
    }
}

// ===== Media session =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Publish(NowPlaying),
    Clear,
}

#[derive(Clone, Default)]
pub struct FakeSession {
    calls: Arc<Mutex<Vec<SessionCall>>>,
}

impl FakeSession {
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<NowPlaying> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SessionCall::Publish(now_playing) => Some(now_playing),
                SessionCall::Clear => None,
            })
            .collect()
    }

    pub fn last_published(&self) -> Option<NowPlaying> {
        self.published().pop()
    }

    pub fn clears(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == SessionCall::Clear)
            .count()
    }
}

#[async_trait]
impl MediaSession for FakeSession {
    async fn publish(&mut self, now_playing: &NowPlaying) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SessionCall::Publish(now_playing.clone()));
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(SessionCall::Clear);
        Ok(())
    }
}

// ===== Artwork =====

/// Serves a fixed image, or fails for every URI when `broken`
#[derive(Clone, Default)]
pub struct FakeArtwork {
    pub broken: bool,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeArtwork {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtworkLoader for FakeArtwork {
    async fn load(&self, uri: &str) -> Result<ArtworkData> {
        self.requests.lock().unwrap().push(uri.to_string());
        if self.broken {
            return Err(PlaybackError::artwork("connection refused"));
        }
        Ok(ArtworkData {
            data: Arc::from(&b"\xFF\xD8\xFF"[..]),
            mime_type: "image/jpeg".to_string(),
        })
    }
}
