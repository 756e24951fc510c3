//! Simulated platform player
//!
//! Stands in for a real audio engine: no audio is decoded, time simply runs.
//! Preparation takes `prepare_delay_ms`, position reports arrive every
//! `tick_ms`, and the media completes once the position reaches its
//! duration. `speed` scales how fast the position moves.

use async_trait::async_trait;
use encore_playback::{
    MediaSource, PlatformEvent, PlatformEventSender, PlatformPlayer, PlaybackError, Result,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::SimulatorSettings;

/// Error code for media the simulator refuses to play
pub const UNSUPPORTED_MEDIA: i32 = 1;

/// Shared between the player and its clock task
#[derive(Debug, Default)]
struct Playhead {
    playing: AtomicBool,
    position_ms: AtomicU64,
}

pub struct SimulatedPlayer {
    events: PlatformEventSender,
    settings: SimulatorSettings,
    media: Option<MediaSource>,
    playhead: Arc<Playhead>,
    clock: Option<JoinHandle<()>>,
}

impl SimulatedPlayer {
    pub fn new(events: PlatformEventSender, settings: SimulatorSettings) -> Self {
        Self {
            events,
            settings,
            media: None,
            playhead: Arc::new(Playhead::default()),
            clock: None,
        }
    }

    fn stop_clock(&mut self) {
        if let Some(clock) = self.clock.take() {
            clock.abort();
        }
    }

    fn reset(&mut self) {
        self.stop_clock();
        self.playhead.playing.store(false, Ordering::SeqCst);
        self.playhead.position_ms.store(0, Ordering::SeqCst);
    }

    fn duration_of(&self, media: &MediaSource) -> u64 {
        media
            .duration_ms
            .filter(|d| *d > 0)
            .unwrap_or(self.settings.fallback_duration_ms)
    }
}

#[async_trait]
impl PlatformPlayer for SimulatedPlayer {
    async fn load(&mut self, media: &MediaSource) -> Result<()> {
        self.reset();
        debug!(item = %media.item_id, locator = %media.locator, "Simulator loaded media");
        self.media = Some(media.clone());
        Ok(())
    }

    async fn prepare(&mut self) -> Result<()> {
        let Some(media) = self.media.clone() else {
            return Err(PlaybackError::platform("prepare without media"));
        };

        self.stop_clock();
        let clock = Clock {
            item_id: media.item_id,
            generation: media.generation,
            supported: media.locator.starts_with("http://") || media.locator.starts_with("https://"),
            duration_ms: self.duration_of(&media),
            prepare_delay: Duration::from_millis(self.settings.prepare_delay_ms),
            tick: Duration::from_millis(self.settings.tick_ms.max(1)),
            speed: self.settings.speed,
            playhead: Arc::clone(&self.playhead),
            events: self.events.clone(),
        };
        self.clock = Some(tokio::spawn(clock.run()));
        Ok(())
    }

    async fn play(&mut self) -> Result<()> {
        if self.media.is_none() {
            return Err(PlaybackError::platform("play without media"));
        }
        self.playhead.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.playhead.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn seek(&mut self, position_ms: u64) -> Result<()> {
        let Some(media) = &self.media else {
            return Err(PlaybackError::platform("seek without media"));
        };
        let target = position_ms.min(self.duration_of(media));
        self.playhead.position_ms.store(target, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.reset();
        self.media = None;
        Ok(())
    }

    async fn release(&mut self) {
        self.reset();
        self.media = None;
        debug!("Simulator released");
    }

    fn is_playing(&self) -> bool {
        self.playhead.playing.load(Ordering::SeqCst)
    }

    fn position_ms(&self) -> u64 {
        self.playhead.position_ms.load(Ordering::SeqCst)
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.stop_clock();
    }
}

/// Time source for one prepared media
struct Clock {
    item_id: encore_playback::QueueItemId,
    generation: u64,
    supported: bool,
    duration_ms: u64,
    prepare_delay: Duration,
    tick: Duration,
    speed: f64,
    playhead: Arc<Playhead>,
    events: PlatformEventSender,
}

impl Clock {
    async fn run(self) {
        tokio::time::sleep(self.prepare_delay).await;

        if !self.supported {
            let _ = self
                .events
                .send(PlatformEvent::Error {
                    item_id: self.item_id,
                    generation: self.generation,
                    code: UNSUPPORTED_MEDIA,
                    message: "unsupported media locator".to_string(),
                })
                .await;
            return;
        }

        let prepared = PlatformEvent::Prepared {
            item_id: self.item_id,
            generation: self.generation,
            duration_ms: Some(self.duration_ms),
        };
        if self.events.send(prepared).await.is_err() {
            return;
        }

        let step = (self.tick.as_millis() as f64 * self.speed).round() as u64;
        let mut interval = tokio::time::interval(self.tick);
        interval.tick().await;

        loop {
            interval.tick().await;
            if !self.playhead.playing.load(Ordering::SeqCst) {
                continue;
            }

            let position = (self.playhead.position_ms.load(Ordering::SeqCst) + step)
                .min(self.duration_ms);
            self.playhead.position_ms.store(position, Ordering::SeqCst);
            trace!(item = %self.item_id, position, "Simulator tick");

            let report = PlatformEvent::Position {
                item_id: self.item_id,
                generation: self.generation,
                position_ms: position,
            };
            if self.events.try_send(report).is_err() && self.events.is_closed() {
                return;
            }

            if position >= self.duration_ms {
                self.playhead.playing.store(false, Ordering::SeqCst);
                let _ = self
                    .events
                    .send(PlatformEvent::Completed {
                        item_id: self.item_id,
                        generation: self.generation,
                    })
                    .await;
                return;
            }
        }
    }
}
