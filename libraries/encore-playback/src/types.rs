//! Core types for playback management

use encore_core::{Track, TrackId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_QUEUE_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Synthetic identifier of a queue item
///
/// Distinct from the track id so the same track can sit in the queue more
/// than once. Ids are unique and increasing for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueItemId(u64);

impl QueueItemId {
    pub(crate) fn next() -> Self {
        Self(NEXT_QUEUE_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueueItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// A positioned occurrence of a track in the play queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueItem {
    id: QueueItemId,
    track: Arc<Track>,
}

impl QueueItem {
    /// Wrap a track with a fresh item id
    pub fn new(track: impl Into<Arc<Track>>) -> Self {
        Self {
            id: QueueItemId::next(),
            track: track.into(),
        }
    }

    pub fn id(&self) -> QueueItemId {
        self.id
    }

    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    pub fn track_id(&self) -> TrackId {
        self.track.id()
    }

    /// Preview locator to hand to the platform player
    pub fn locator(&self) -> &str {
        self.track.preview()
    }
}

/// Playback status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No track loaded
    #[default]
    Idle,

    /// Platform player is preparing the current item
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Load or playback of the current item failed
    Errored,
}

/// Failure reported by the platform player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackFailure {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for PlaybackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Explicit seek issued through the manager
///
/// `serial` increases with every request so observers can tell a new seek
/// from a repeated one to the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekRequest {
    pub serial: u64,
    pub position_ms: u64,
}

/// Snapshot of the player, published by the manager on every change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackUiState {
    /// Item the player is on, if any
    pub current_item: Option<QueueItem>,

    pub status: PlaybackStatus,

    /// Position within the current item
    pub position_ms: u64,

    /// Duration of the current item (0 when unknown)
    pub duration_ms: u64,

    /// Last failure, cleared by the next successful prepare
    pub error: Option<PlaybackFailure>,

    /// Whole queue, in play order
    pub queue: Vec<QueueItem>,

    /// Index of `current_item` in `queue`
    pub queue_index: Option<usize>,

    /// Increased every time the current item is (re)loaded
    pub load_generation: u64,

    /// Most recent explicit seek
    pub seek_request: Option<SeekRequest>,
}

impl PlaybackUiState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.status == PlaybackStatus::Loading
    }

    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.current_item.as_ref().map(QueueItem::track)
    }
}

/// What `advance()` does on the last item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfQueuePolicy {
    /// Clear the pointer; playback halts
    #[default]
    Stop,

    /// Keep the pointer on the last item
    Stay,
}

/// Configuration for the playback service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Behaviour at the end of the queue (default: Stop)
    pub end_of_queue: EndOfQueuePolicy,

    /// Position drift tolerated before the bridge re-seeks the platform player (default: 1000)
    pub seek_tolerance_ms: u64,

    /// Capacity of the command channel (default: 32)
    pub command_buffer: usize,

    /// Capacity of the platform event channel (default: 64)
    pub event_buffer: usize,

    /// Capacity of the transport command channel (default: 16)
    pub transport_buffer: usize,

    /// Separator for artist names in now-playing metadata (default: ", ")
    pub artist_separator: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            end_of_queue: EndOfQueuePolicy::Stop,
            seek_tolerance_ms: 1000,
            command_buffer: 32,
            event_buffer: 64,
            transport_buffer: 16,
            artist_separator: ", ".to_string(),
        }
    }
}
