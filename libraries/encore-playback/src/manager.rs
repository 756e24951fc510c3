//! Playback manager - single writer of playback state
//!
//! The manager owns the queue and the [`PlaybackUiState`] snapshot. It runs
//! as one task: UI intents arrive as [`PlayerCommand`]s through a
//! [`PlaybackHandle`], platform callbacks arrive as [`PlatformEvent`]s, and
//! both are applied strictly one after the other. Every change is published
//! on a `watch` channel.
//!
//! ```text
//!   Idle ──▶ Loading ──▶ Playing ◀──▶ Paused
//!              ▲   │        │            │
//!              │   ▼        ▼            ▼
//!              └─ Errored ◀─┴────────────┘      (completed: next item or Idle)
//! ```
//!
//! The manager never talks to the platform player; the media-session bridge
//! turns state changes into player commands.

use encore_core::{Track, TrackId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    error::{PlaybackError, Result},
    events::{platform_channel, PlatformEvent, PlatformEventSender},
    queue::QueueManager,
    types::{
        PlaybackConfig, PlaybackFailure, PlaybackStatus, PlaybackUiState, QueueItem,
        QueueItemId, SeekRequest,
    },
};

/// Position reports ignored while waiting for the platform to reach a seek target
const SEEK_SETTLE_MAX_EVENTS: u32 = 8;

type Reply<T> = oneshot::Sender<Result<T>>;

/// Commands sent to the manager task
#[derive(Debug)]
pub enum PlayerCommand {
    TogglePlayback { track: Arc<Track>, reply: Reply<()> },
    TogglePlayPause { reply: Reply<()> },
    Play { reply: Reply<()> },
    Pause { reply: Reply<()> },
    Stop { reply: Reply<()> },
    SeekTo { position_ms: i64, reply: Reply<()> },
    SetQueue { tracks: Vec<Arc<Track>>, start_index: usize, reply: Reply<()> },
    AddToQueue { track: Arc<Track>, reply: Reply<QueueItemId> },
    InsertNext { track: Arc<Track>, reply: Reply<QueueItemId> },
    PlayNext { reply: Reply<()> },
    PlayPrevious { reply: Reply<()> },
    RemoveFromQueue { item_id: QueueItemId, reply: Reply<()> },
    MoveQueueItem { from_index: usize, to_index: usize, reply: Reply<()> },
    ClearQueue { reply: Reply<()> },
    Shutdown { reply: oneshot::Sender<()> },
}

/// Pending explicit seek, used to drop stale position reports
#[derive(Debug, Clone, Copy)]
struct SeekSettle {
    target_ms: u64,
    ignored: u32,
}

/// Central playback state machine
///
/// Orchestrates:
/// - Queue mutation (delegated to [`QueueManager`])
/// - Status transitions driven by UI intents and platform events
/// - Position, duration and error bookkeeping
pub struct MediaPlayerManager {
    config: PlaybackConfig,
    queue: QueueManager,
    state: PlaybackUiState,

    // Start playing as soon as the current item is prepared
    play_when_ready: bool,

    seek_settle: Option<SeekSettle>,
    next_seek_serial: u64,
}

impl MediaPlayerManager {
    /// Create new playback manager
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            queue: QueueManager::with_policy(config.end_of_queue),
            config,
            state: PlaybackUiState::default(),
            play_when_ready: false,
            seek_settle: None,
            next_seek_serial: 1,
        }
    }

    /// Current snapshot
    pub fn state(&self) -> &PlaybackUiState {
        &self.state
    }

    pub fn queue(&self) -> &QueueManager {
        &self.queue
    }

    /// Whether a prepared item will start playing on its own
    pub fn play_when_ready(&self) -> bool {
        self.play_when_ready
    }

    // ===== UI intents =====

    /// Play/pause `track`, or switch playback to it
    ///
    /// On the current track this toggles between playing and paused without
    /// reloading (a failed track is retried). Any other track replaces the
    /// queue and starts loading.
    pub fn toggle_playback(&mut self, track: Arc<Track>) -> Result<()> {
        if self.current_track_id() == Some(track.id()) {
            match self.state.status {
                PlaybackStatus::Playing => self.pause_playback(),
                PlaybackStatus::Paused => self.resume_playback(),
                PlaybackStatus::Loading => {
                    debug!(track = %track.id(), "Toggle ignored while loading");
                }
                PlaybackStatus::Errored | PlaybackStatus::Idle => {
                    info!(track = %track.id(), "Retrying failed track");
                    self.play_when_ready = true;
                    self.begin_loading();
                }
            }
            return Ok(());
        }

        self.queue.set_queue([track], 0)?;
        self.play_when_ready = true;
        self.begin_loading();
        Ok(())
    }

    /// Pause when playing, play otherwise
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.state.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Resume or start playback of the current item
    pub fn play(&mut self) -> Result<()> {
        match self.state.status {
            PlaybackStatus::Paused => self.resume_playback(),
            PlaybackStatus::Loading => self.play_when_ready = true,
            PlaybackStatus::Playing => {}
            PlaybackStatus::Errored => {
                self.play_when_ready = true;
                self.begin_loading();
            }
            PlaybackStatus::Idle => return Err(PlaybackError::NoTrackLoaded),
        }
        Ok(())
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self) -> Result<()> {
        match self.state.status {
            PlaybackStatus::Playing => self.pause_playback(),
            PlaybackStatus::Loading => self.play_when_ready = false,
            PlaybackStatus::Paused | PlaybackStatus::Errored | PlaybackStatus::Idle => {}
        }
        Ok(())
    }

    /// Unconditional transition to Idle
    ///
    /// The queue keeps its items but loses its pointer; the bridge releases
    /// the platform media once it sees no current item.
    pub fn stop(&mut self) -> Result<()> {
        self.queue.reset_pointer();
        self.play_when_ready = false;
        self.state.error = None;
        self.go_idle();
        Ok(())
    }

    /// Seek within the current item
    ///
    /// Only valid while playing or paused. The target is clamped to
    /// `[0, duration]`; with an unknown duration only the lower bound applies.
    pub fn seek_to(&mut self, position_ms: i64) -> Result<()> {
        if !matches!(
            self.state.status,
            PlaybackStatus::Playing | PlaybackStatus::Paused
        ) {
            warn!(status = ?self.state.status, "Seek rejected");
            return Err(PlaybackError::InvalidState(self.state.status));
        }

        let mut target = position_ms.max(0) as u64;
        if self.state.duration_ms > 0 {
            target = target.min(self.state.duration_ms);
        }

        let serial = self.next_seek_serial;
        self.next_seek_serial += 1;

        debug!(requested = position_ms, target, serial, "Seek");
        self.state.position_ms = target;
        self.state.seek_request = Some(SeekRequest {
            serial,
            position_ms: target,
        });
        self.seek_settle = Some(SeekSettle {
            target_ms: target,
            ignored: 0,
        });
        Ok(())
    }

    /// Replace the queue and point at `start_index`
    ///
    /// Starts loading only when the current track changes. If the same track
    /// stays current its queue item keeps its identity, so nothing restarts.
    pub fn set_playback_queue(&mut self, tracks: Vec<Arc<Track>>, start_index: usize) -> Result<()> {
        let previous = self.state.current_item.clone();

        if let Err(e) = self.queue.set_queue(tracks, start_index) {
            warn!(error = %e, "Rejected queue replacement");
            return Err(e);
        }

        let Some(new_track) = self.queue.current().map(QueueItem::track_id) else {
            self.go_idle();
            return Ok(());
        };

        if let Some(previous) = previous.filter(|p| p.track_id() == new_track) {
            if self.queue.adopt_current(previous) {
                debug!(track = %new_track, "Queue replaced, current track unchanged");
                self.sync_queue_view();
                return Ok(());
            }
        }

        self.play_when_ready = true;
        self.begin_loading();
        Ok(())
    }

    /// Append a track; on an empty queue it becomes current without auto-play
    pub fn add_track_to_queue(&mut self, track: Arc<Track>) -> QueueItemId {
        let had_current = self.queue.current().is_some();
        let id = self.queue.add_to_queue(track);

        if !had_current && self.queue.current().is_some() {
            self.play_when_ready = false;
            self.begin_loading();
        } else {
            self.sync_queue_view();
        }
        id
    }

    /// Insert a track right after the current item
    pub fn insert_next(&mut self, track: Arc<Track>) -> QueueItemId {
        let had_current = self.queue.current().is_some();
        let id = self.queue.insert_next(track);

        if !had_current && self.queue.current().is_some() {
            self.play_when_ready = false;
            self.begin_loading();
        } else {
            self.sync_queue_view();
        }
        id
    }

    /// Skip to the next item
    pub fn play_next(&mut self) -> Result<()> {
        let before = self.current_item_id();
        self.queue.advance();
        self.follow_queue(before);
        Ok(())
    }

    /// Go back to the previous item
    pub fn play_previous(&mut self) -> Result<()> {
        let before = self.current_item_id();
        self.queue.retreat();
        self.follow_queue(before);
        Ok(())
    }

    /// Remove an item; removing the current one moves playback along
    pub fn remove_from_queue(&mut self, item_id: QueueItemId) -> Result<()> {
        let before = self.current_item_id();
        if self.queue.remove(item_id).is_none() {
            warn!(item = %item_id, "Remove of unknown queue item");
            return Err(PlaybackError::ItemNotFound(item_id));
        }
        self.follow_queue(before);
        Ok(())
    }

    /// Reorder the queue
    pub fn move_queue_item(&mut self, from_index: usize, to_index: usize) -> Result<()> {
        if let Err(e) = self.queue.reorder(from_index, to_index) {
            warn!(error = %e, "Rejected queue reorder");
            return Err(e);
        }
        self.sync_queue_view();
        Ok(())
    }

    pub fn clear_queue(&mut self) -> Result<()> {
        self.queue.clear();
        self.play_when_ready = false;
        self.go_idle();
        Ok(())
    }

    // ===== Platform events =====

    /// Apply a platform player event
    pub fn handle_platform_event(&mut self, event: PlatformEvent) {
        if self.current_item_id() != Some(event.item_id()) {
            debug!(item = %event.item_id(), "Dropping event for stale item");
            return;
        }
        if event.generation() != self.state.load_generation {
            debug!(
                item = %event.item_id(),
                generation = event.generation(),
                current = self.state.load_generation,
                "Dropping event from an earlier load"
            );
            return;
        }

        match event {
            PlatformEvent::Prepared { duration_ms, .. } => self.on_prepared(duration_ms),
            PlatformEvent::Completed { .. } => self.on_completed(),
            PlatformEvent::Error { code, message, .. } => self.on_error(code, message),
            PlatformEvent::Position { position_ms, .. } => self.on_position(position_ms),
        }
    }

    fn on_prepared(&mut self, duration_ms: Option<u64>) {
        if self.state.status != PlaybackStatus::Loading {
            debug!(status = ?self.state.status, "Prepared outside of Loading, ignored");
            return;
        }

        if let Some(duration_ms) = duration_ms.filter(|d| *d > 0) {
            self.state.duration_ms = duration_ms;
        }
        self.state.error = None;
        self.state.status = if self.play_when_ready {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        };
        info!(
            item = ?self.current_item_id(),
            status = ?self.state.status,
            duration_ms = self.state.duration_ms,
            "Item prepared"
        );
    }

    fn on_completed(&mut self) {
        let before = self.current_item_id_in_queue();
        self.queue.advance();

        if self.current_item_id_in_queue() == before {
            // Stay policy on the last item: park at the end
            self.play_when_ready = false;
            self.state.status = PlaybackStatus::Paused;
            self.state.position_ms = self.state.duration_ms;
            self.sync_queue_view();
            return;
        }

        info!(next = ?self.current_item_id_in_queue(), "Item completed");
        self.follow_queue(before);
    }

    fn on_error(&mut self, code: i32, message: String) {
        error!(item = ?self.current_item_id(), code, message = %message, "Playback failed");
        self.play_when_ready = false;
        self.seek_settle = None;
        self.state.status = PlaybackStatus::Errored;
        self.state.error = Some(PlaybackFailure { code, message });
    }

    fn on_position(&mut self, position_ms: u64) {
        if !matches!(
            self.state.status,
            PlaybackStatus::Playing | PlaybackStatus::Paused
        ) {
            return;
        }

        if let Some(settle) = self.seek_settle.as_mut() {
            if position_ms.abs_diff(settle.target_ms) > self.config.seek_tolerance_ms
                && settle.ignored < SEEK_SETTLE_MAX_EVENTS
            {
                settle.ignored += 1;
                return;
            }
            self.seek_settle = None;
        }

        self.state.position_ms = if self.state.duration_ms > 0 {
            position_ms.min(self.state.duration_ms)
        } else {
            position_ms
        };
    }

    // ===== Transitions =====

    fn pause_playback(&mut self) {
        self.play_when_ready = false;
        self.state.status = PlaybackStatus::Paused;
    }

    fn resume_playback(&mut self) {
        self.play_when_ready = true;
        self.state.status = PlaybackStatus::Playing;
    }

    /// Load whatever the queue points at now, or go idle
    fn follow_queue(&mut self, before: Option<QueueItemId>) {
        if self.current_item_id_in_queue() == before {
            self.sync_queue_view();
            return;
        }

        if self.queue.current().is_some() {
            if self.state.status == PlaybackStatus::Playing {
                self.play_when_ready = true;
            }
            self.begin_loading();
        } else {
            self.play_when_ready = false;
            self.go_idle();
        }
    }

    fn begin_loading(&mut self) {
        let Some(item) = self.queue.current().cloned() else {
            self.go_idle();
            return;
        };

        debug!(item = %item.id(), track = %item.track_id(), "Loading");
        self.state.duration_ms = item.track().duration_ms().unwrap_or(0);
        self.state.current_item = Some(item);
        self.state.status = PlaybackStatus::Loading;
        self.state.position_ms = 0;
        self.state.load_generation += 1;
        self.seek_settle = None;
        self.sync_queue_view();
    }

    fn go_idle(&mut self) {
        debug!("Idle");
        self.state.current_item = None;
        self.state.status = PlaybackStatus::Idle;
        self.state.position_ms = 0;
        self.state.duration_ms = 0;
        self.seek_settle = None;
        self.sync_queue_view();
    }

    fn sync_queue_view(&mut self) {
        self.state.queue = self.queue.items().to_vec();
        self.state.queue_index = self.queue.current_index();
    }

    fn current_item_id(&self) -> Option<QueueItemId> {
        self.state.current_item.as_ref().map(QueueItem::id)
    }

    fn current_item_id_in_queue(&self) -> Option<QueueItemId> {
        self.queue.current().map(QueueItem::id)
    }

    fn current_track_id(&self) -> Option<TrackId> {
        self.state.current_item.as_ref().map(QueueItem::track_id)
    }

    // ===== Task =====

    fn apply(&mut self, command: PlayerCommand) {
        // A dropped reply only means the caller stopped waiting
        match command {
            PlayerCommand::TogglePlayback { track, reply } => {
                let _ = reply.send(self.toggle_playback(track));
            }
            PlayerCommand::TogglePlayPause { reply } => {
                let _ = reply.send(self.toggle_play_pause());
            }
            PlayerCommand::Play { reply } => {
                let _ = reply.send(self.play());
            }
            PlayerCommand::Pause { reply } => {
                let _ = reply.send(self.pause());
            }
            PlayerCommand::Stop { reply } => {
                let _ = reply.send(self.stop());
            }
            PlayerCommand::SeekTo { position_ms, reply } => {
                let _ = reply.send(self.seek_to(position_ms));
            }
            PlayerCommand::SetQueue {
                tracks,
                start_index,
                reply,
            } => {
                let _ = reply.send(self.set_playback_queue(tracks, start_index));
            }
            PlayerCommand::AddToQueue { track, reply } => {
                let _ = reply.send(Ok(self.add_track_to_queue(track)));
            }
            PlayerCommand::InsertNext { track, reply } => {
                let _ = reply.send(Ok(self.insert_next(track)));
            }
            PlayerCommand::PlayNext { reply } => {
                let _ = reply.send(self.play_next());
            }
            PlayerCommand::PlayPrevious { reply } => {
                let _ = reply.send(self.play_previous());
            }
            PlayerCommand::RemoveFromQueue { item_id, reply } => {
                let _ = reply.send(self.remove_from_queue(item_id));
            }
            PlayerCommand::MoveQueueItem {
                from_index,
                to_index,
                reply,
            } => {
                let _ = reply.send(self.move_queue_item(from_index, to_index));
            }
            PlayerCommand::ClearQueue { reply } => {
                let _ = reply.send(self.clear_queue());
            }
            PlayerCommand::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn publish(&self, publisher: &watch::Sender<PlaybackUiState>) {
        publisher.send_if_modified(|published| {
            if *published == self.state {
                false
            } else {
                published.clone_from(&self.state);
                true
            }
        });
    }

    /// Spawn the manager task
    ///
    /// Returns the handle for UI intents and the sender the platform player
    /// reports through. Must be called inside a Tokio runtime.
    pub fn spawn(self) -> (PlaybackHandle, PlatformEventSender, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer.max(1));
        let (event_tx, event_rx) = platform_channel(self.config.event_buffer);
        let (state_tx, state_rx) = watch::channel(self.state.clone());

        let task = tokio::spawn(self.run(command_rx, event_rx, state_tx));

        let handle = PlaybackHandle {
            commands: command_tx,
            state: state_rx,
        };
        (handle, event_tx, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<PlayerCommand>,
        mut events: mpsc::Receiver<PlatformEvent>,
        publisher: watch::Sender<PlaybackUiState>,
    ) {
        info!("Playback manager started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command @ PlayerCommand::Shutdown { .. }) => {
                        self.apply(command);
                        break;
                    }
                    Some(command) => self.apply(command),
                    None => break,
                },
                Some(event) = events.recv() => self.handle_platform_event(event),
            }

            self.publish(&publisher);
        }

        // Dropping the publisher ends every subscription; no state after this point
        info!("Playback manager stopped");
    }
}

/// Cloneable handle to a running playback manager
///
/// Every mutation waits until the manager has applied it, so the state seen
/// through [`PlaybackHandle::state`] afterwards already reflects it.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    commands: mpsc::Sender<PlayerCommand>,
    state: watch::Receiver<PlaybackUiState>,
}

impl PlaybackHandle {
    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> PlayerCommand) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| PlaybackError::ServiceStopped)?;
        response.await.map_err(|_| PlaybackError::ServiceStopped)?
    }

    /// Latest published state
    pub fn state(&self) -> PlaybackUiState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes (conflating: only the latest value is kept)
    pub fn subscribe(&self) -> watch::Receiver<PlaybackUiState> {
        self.state.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.commands.is_closed()
    }

    pub async fn toggle_playback(&self, track: impl Into<Arc<Track>>) -> Result<()> {
        let track = track.into();
        self.request(|reply| PlayerCommand::TogglePlayback { track, reply })
            .await
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::TogglePlayPause { reply })
            .await
    }

    pub async fn play(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::Play { reply }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::Pause { reply }).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::Stop { reply }).await
    }

    pub async fn seek_to(&self, position_ms: i64) -> Result<()> {
        self.request(|reply| PlayerCommand::SeekTo { position_ms, reply })
            .await
    }

    pub async fn set_playback_queue<I>(&self, tracks: I, start_index: usize) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Arc<Track>>,
    {
        let tracks = tracks.into_iter().map(Into::into).collect();
        self.request(|reply| PlayerCommand::SetQueue {
            tracks,
            start_index,
            reply,
        })
        .await
    }

    pub async fn add_track_to_queue(&self, track: impl Into<Arc<Track>>) -> Result<QueueItemId> {
        let track = track.into();
        self.request(|reply| PlayerCommand::AddToQueue { track, reply })
            .await
    }

    pub async fn insert_next(&self, track: impl Into<Arc<Track>>) -> Result<QueueItemId> {
        let track = track.into();
        self.request(|reply| PlayerCommand::InsertNext { track, reply })
            .await
    }

    pub async fn play_next(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::PlayNext { reply }).await
    }

    pub async fn play_previous(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::PlayPrevious { reply })
            .await
    }

    pub async fn remove_from_queue(&self, item_id: QueueItemId) -> Result<()> {
        self.request(|reply| PlayerCommand::RemoveFromQueue { item_id, reply })
            .await
    }

    pub async fn move_queue_item(&self, from_index: usize, to_index: usize) -> Result<()> {
        self.request(|reply| PlayerCommand::MoveQueueItem {
            from_index,
            to_index,
            reply,
        })
        .await
    }

    pub async fn clear_queue(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::ClearQueue { reply })
            .await
    }

    /// Stop the manager task; later calls fail with `ServiceStopped`
    pub(crate) async fn shutdown(&self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.commands
            .send(PlayerCommand::Shutdown { reply })
            .await
            .map_err(|_| PlaybackError::ServiceStopped)?;
        done.await.map_err(|_| PlaybackError::ServiceStopped)
    }
}
