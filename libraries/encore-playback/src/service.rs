//! Playback service - owner of the playback tasks
//!
//! Wires a [`MediaPlayerManager`], a [`MediaSessionBridge`] and the
//! transport-command pump together and controls their lifetime. Consumers get
//! a [`PlaybackHandle`] passed to them; there is no global player.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    bridge::MediaSessionBridge,
    error::{PlaybackError, Result},
    events::{transport_channel, PlatformEventSender, TransportCommand, TransportSender},
    manager::{MediaPlayerManager, PlaybackHandle},
    platform::PlatformPlayer,
    session::{ArtworkLoader, MediaSession},
    types::{PlaybackConfig, PlaybackUiState},
};

/// Running playback engine
///
/// # Example
///
/// ```rust,ignore
/// let service = PlaybackService::start(
///     PlaybackConfig::default(),
///     |events| MyPlayer::new(events),
///     |transport| MySession::new(transport),
///     NoArtwork,
/// );
///
/// service.handle().toggle_playback(track).await?;
/// service.shutdown().await?;
/// ```
pub struct PlaybackService {
    handle: PlaybackHandle,
    transport: TransportSender,
    manager_task: JoinHandle<()>,
    bridge_task: JoinHandle<()>,
    transport_task: JoinHandle<()>,
}

impl PlaybackService {
    /// Start the manager, bridge and transport tasks
    ///
    /// `player` receives the sender it must report platform events through;
    /// `session` receives the sender for lock-screen transport commands.
    /// Must be called inside a Tokio runtime.
    pub fn start<P, S, A>(
        config: PlaybackConfig,
        player: impl FnOnce(PlatformEventSender) -> P,
        session: impl FnOnce(TransportSender) -> S,
        artwork: A,
    ) -> Self
    where
        P: PlatformPlayer + 'static,
        S: MediaSession + 'static,
        A: ArtworkLoader + 'static,
    {
        let (transport, transport_rx) = transport_channel(config.transport_buffer);

        let manager = MediaPlayerManager::new(config.clone());
        let (handle, events, manager_task) = manager.spawn();

        let bridge = MediaSessionBridge::new(
            &config,
            player(events.clone()),
            session(transport.clone()),
            artwork,
            events,
        );
        let bridge_task = tokio::spawn(bridge.run(handle.subscribe()));

        let transport_task = tokio::spawn(pump_transport(
            handle.clone(),
            transport_rx,
            handle.subscribe(),
        ));

        info!("Playback service started");

        Self {
            handle,
            transport,
            manager_task,
            bridge_task,
            transport_task,
        }
    }

    /// Handle for UI intents
    pub fn handle(&self) -> &PlaybackHandle {
        &self.handle
    }

    /// Sender for transport commands, as the media session would issue them
    pub fn transport(&self) -> TransportSender {
        self.transport.clone()
    }

    /// Latest published state
    pub fn state(&self) -> PlaybackUiState {
        self.handle.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackUiState> {
        self.handle.subscribe()
    }

    /// Tear the service down
    ///
    /// Stops the manager (no state is published afterwards), lets the bridge
    /// stop and release the platform player and clear the session, then waits
    /// for every task. Handles kept elsewhere fail with `ServiceStopped`.
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down playback service");

        match self.handle.shutdown().await {
            Ok(()) | Err(PlaybackError::ServiceStopped) => {}
            Err(e) => return Err(e),
        }

        let mut failure = None;
        for (name, task) in [
            ("manager", self.manager_task),
            ("bridge", self.bridge_task),
            ("transport", self.transport_task),
        ] {
            if let Err(e) = task.await {
                warn!(task = name, error = %e, "Playback task ended abnormally");
                failure.get_or_insert(PlaybackError::TaskFailed(format!("{name}: {e}")));
            }
        }

        info!("Playback service stopped");
        failure.map_or(Ok(()), Err)
    }
}

/// Forward transport commands to the manager until the manager stops
async fn pump_transport(
    handle: PlaybackHandle,
    mut commands: mpsc::Receiver<TransportCommand>,
    mut states: watch::Receiver<PlaybackUiState>,
) {
    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                debug!(?command, "Transport command");

                match dispatch_transport(&handle, command).await {
                    Ok(()) => {}
                    Err(PlaybackError::ServiceStopped) => break,
                    Err(e) => warn!(?command, error = %e, "Transport command rejected"),
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    debug!("Transport pump stopped");
}

async fn dispatch_transport(handle: &PlaybackHandle, command: TransportCommand) -> Result<()> {
    match command {
        TransportCommand::Play => handle.play().await,
        TransportCommand::Pause => handle.pause().await,
        TransportCommand::TogglePlayPause => handle.toggle_play_pause().await,
        TransportCommand::Next => handle.play_next().await,
        TransportCommand::Previous => handle.play_previous().await,
        TransportCommand::Stop => handle.stop().await,
        TransportCommand::SeekTo(position_ms) => handle.seek_to(position_ms).await,
    }
}
