//! Encore - Playback Engine
//!
//! Play queue and media-session synchronization for Encore.
//!
//! This crate provides:
//! - A play queue with synthetic item ids (the same track may repeat)
//! - A single-writer playback state machine running as a task
//! - A bridge that keeps the platform player and the OS media session in
//!   line with the published state
//! - A service owning all of the above, torn down in one call
//!
//! # Architecture
//!
//! ```text
//!   UI ── PlaybackHandle ──▶ MediaPlayerManager ──watch──▶ MediaSessionBridge
//!                                  ▲                           │        │
//!                         PlatformEvent                        ▼        ▼
//!                                  └──────────────────── PlatformPlayer  MediaSession
//! ```
//!
//! The manager never calls the platform player. Platform callbacks are
//! messages into the manager task, and commands flow one way from state
//! through the bridge to the player.
//!
//! `encore-playback` has no platform code of its own: audio engines and
//! media sessions plug in through the [`PlatformPlayer`], [`MediaSession`]
//! and [`ArtworkLoader`] traits.
//!
//! # Example: Queue
//!
//! ```rust
//! use encore_core::{ArtistRef, Track, TrackId};
//! use encore_playback::QueueManager;
//!
//! let track = |id| {
//!     Track::builder(TrackId::new(id), format!("Track {id}"))
//!         .artist(ArtistRef::new(1, "Artist"))
//!         .preview(format!("https://cdn.example.com/{id}.mp3"))
//!         .build()
//!         .unwrap()
//! };
//!
//! let mut queue = QueueManager::new();
//! queue.set_queue([track(1), track(2), track(3)], 1).unwrap();
//! assert_eq!(queue.current().unwrap().track_id(), TrackId::new(2));
//!
//! queue.advance();
//! queue.advance();
//! assert!(queue.current().is_none());
//! ```
//!
//! # Example: Service
//!
//! ```rust,ignore
//! let service = PlaybackService::start(
//!     PlaybackConfig::default(),
//!     |events| MyPlayer::new(events),
//!     |transport| MySession::new(transport),
//!     NoArtwork,
//! );
//!
//! let handle = service.handle().clone();
//! handle.set_playback_queue(tracks, 0).await?;
//!
//! let mut states = handle.subscribe();
//! while states.changed().await.is_ok() {
//!     println!("{:?}", states.borrow().status);
//! }
//! ```

mod bridge;
mod error;
mod events;
mod manager;
mod platform;
mod queue;
mod service;
mod session;
pub mod types;

// Public exports
pub use bridge::MediaSessionBridge;
pub use error::{PlaybackError, Result};
pub use events::{
    PlatformEvent, PlatformEventSender, TransportCommand, TransportSender,
    PLATFORM_COMMAND_FAILED,
};
pub use manager::{MediaPlayerManager, PlaybackHandle, PlayerCommand};
pub use platform::{MediaSource, PlatformPlayer};
pub use queue::QueueManager;
pub use service::PlaybackService;
pub use session::{
    ArtworkData, ArtworkLoader, MediaSession, NoArtwork, NowPlaying, NowPlayingArtwork,
};
pub use types::{
    EndOfQueuePolicy, PlaybackConfig, PlaybackFailure, PlaybackStatus, PlaybackUiState,
    QueueItem, QueueItemId, SeekRequest,
};
