//! Playback Events
//!
//! Messages crossing into the playback manager from outside its task:
//! - Platform player callbacks (prepared, completed, error, position)
//! - Transport commands from the OS media session (play, pause, next, ...)
//!
//! Both travel over bounded channels so callbacks never touch playback state
//! directly; the manager applies them one at a time.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{PlaybackError, Result};
use crate::types::QueueItemId;

/// Error code used when a platform command fails before the player reports anything
pub const PLATFORM_COMMAND_FAILED: i32 = -1;

/// Low-level events emitted by the platform player
///
/// Every event names the queue item and the load generation it belongs to,
/// both copied from the [`MediaSource`] being played. Events for an item that
/// is no longer current, or from an earlier load of the same item, are
/// dropped by the manager.
///
/// [`MediaSource`]: crate::platform::MediaSource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformEvent {
    /// Media is ready to play
    Prepared {
        item_id: QueueItemId,
        generation: u64,
        /// Duration reported by the decoder, when known
        duration_ms: Option<u64>,
    },

    /// Media played to its end
    Completed { item_id: QueueItemId, generation: u64 },

    /// Loading or playback failed
    Error {
        item_id: QueueItemId,
        generation: u64,
        code: i32,
        message: String,
    },

    /// Periodic position report
    Position {
        item_id: QueueItemId,
        generation: u64,
        position_ms: u64,
    },
}

impl PlatformEvent {
    pub fn item_id(&self) -> QueueItemId {
        match self {
            PlatformEvent::Prepared { item_id, .. }
            | PlatformEvent::Completed { item_id, .. }
            | PlatformEvent::Error { item_id, .. }
            | PlatformEvent::Position { item_id, .. } => *item_id,
        }
    }

    /// Load generation of the media the event belongs to
    pub fn generation(&self) -> u64 {
        match self {
            PlatformEvent::Prepared { generation, .. }
            | PlatformEvent::Completed { generation, .. }
            | PlatformEvent::Error { generation, .. }
            | PlatformEvent::Position { generation, .. } => *generation,
        }
    }
}

/// Sending half of the platform event channel
///
/// Handed to the platform player when the service starts. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PlatformEventSender {
    tx: mpsc::Sender<PlatformEvent>,
}

impl PlatformEventSender {
    pub(crate) fn new(tx: mpsc::Sender<PlatformEvent>) -> Self {
        Self { tx }
    }

    /// Deliver an event, waiting for channel capacity
    pub async fn send(&self, event: PlatformEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| PlaybackError::ServiceStopped)
    }

    /// Deliver an event from a non-async callback context
    ///
    /// Position reports may be dropped when the channel is full; they are
    /// superseded by the next one anyway.
    pub fn try_send(&self, event: PlatformEvent) -> Result<()> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(PlatformEvent::Position { .. })) => Ok(()),
            Err(mpsc::error::TrySendError::Full(event)) => {
                Err(PlaybackError::platform(format!("event channel full, dropped {event:?}")))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PlaybackError::ServiceStopped),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create the platform event channel
pub(crate) fn platform_channel(capacity: usize) -> (PlatformEventSender, mpsc::Receiver<PlatformEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (PlatformEventSender::new(tx), rx)
}

/// User-initiated transport commands from the OS media session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportCommand {
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    Stop,
    SeekTo(i64),
}

/// Sending half of the transport command channel
#[derive(Debug, Clone)]
pub struct TransportSender {
    tx: mpsc::Sender<TransportCommand>,
}

impl TransportSender {
    pub async fn send(&self, command: TransportCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| PlaybackError::ServiceStopped)
    }

    pub fn try_send(&self, command: TransportCommand) -> Result<()> {
        self.tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(command) => {
                PlaybackError::session(format!("transport channel full, dropped {command:?}"))
            }
            mpsc::error::TrySendError::Closed(_) => PlaybackError::ServiceStopped,
        })
    }
}

/// Create the transport command channel
pub(crate) fn transport_channel(
    capacity: usize,
) -> (TransportSender, mpsc::Receiver<TransportCommand>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (TransportSender { tx }, rx)
}
