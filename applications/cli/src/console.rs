//! Interactive console for the headless player
//!
//! Reads one-letter commands line by line and forwards them to the playback
//! service the way a media session's transport controls would.

use encore_playback::{PlaybackService, PlaybackStatus, PlaybackUiState, QueueItemId, TransportCommand};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, warn};

use crate::error::Result;

/// Seek step of the `f` / `r` keys
const SEEK_STEP_MS: i64 = 10_000;

pub const HELP: &str = "p: play/pause  n: next  b: previous  f/r: +/-10s  s: stop  q: quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Transport(TransportCommand),
    /// Relative seek in milliseconds
    SeekBy(i64),
    Quit,
}

/// Parse one input line
pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let command = match line.trim() {
        "p" | "space" => ConsoleCommand::Transport(TransportCommand::TogglePlayPause),
        "n" => ConsoleCommand::Transport(TransportCommand::Next),
        "b" => ConsoleCommand::Transport(TransportCommand::Previous),
        "s" => ConsoleCommand::Transport(TransportCommand::Stop),
        "f" => ConsoleCommand::SeekBy(SEEK_STEP_MS),
        "r" => ConsoleCommand::SeekBy(-SEEK_STEP_MS),
        "q" | "quit" | "exit" => ConsoleCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// Run the console until quit, interrupt or the end of the queue, then shut the service down
///
/// When `input` reaches end of file the player keeps going until the queue
/// is finished.
pub async fn drive<R, I>(service: PlaybackService, input: R, interrupt: I) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    I: Future<Output = ()>,
{
    let mut lines = input.lines();
    let mut input_open = true;
    let mut states = service.subscribe();
    let transport = service.transport();
    tokio::pin!(interrupt);

    let mut started = service.state().status != PlaybackStatus::Idle;
    let mut last_reported: Option<(Option<QueueItemId>, PlaybackStatus)> = None;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => match parse_command(&line) {
                    Some(ConsoleCommand::Quit) => break,
                    Some(ConsoleCommand::Transport(command)) => transport.send(command).await?,
                    Some(ConsoleCommand::SeekBy(delta)) => {
                        let target = service.state().position_ms as i64 + delta;
                        if let Err(e) = service.handle().seek_to(target).await {
                            warn!(error = %e, "Seek ignored");
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => warn!(input = %line.trim(), "Unknown command ({HELP})"),
                },
                None => input_open = false,
            },
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                report(&state, &mut last_reported);

                if state.status != PlaybackStatus::Idle {
                    started = true;
                } else if started {
                    info!("Queue finished");
                    break;
                }
            }
            () = &mut interrupt => {
                info!("Interrupted");
                break;
            }
        }
    }

    service.shutdown().await?;
    Ok(())
}

fn report(state: &PlaybackUiState, last: &mut Option<(Option<QueueItemId>, PlaybackStatus)>) {
    let key = (state.current_item.as_ref().map(|item| item.id()), state.status);
    if last.as_ref() == Some(&key) {
        return;
    }
    *last = Some(key);

    match (state.current_track(), state.status) {
        (Some(track), PlaybackStatus::Errored) => error!(
            track = %track.title(),
            error = %state.error.as_ref().map(ToString::to_string).unwrap_or_default(),
            "Playback failed"
        ),
        (Some(track), status) => info!(
            track = %track.title(),
            ?status,
            position = state.queue_index.map_or(0, |i| i + 1),
            of = state.queue.len(),
            "Player"
        ),
        (None, status) => info!(?status, "Player"),
    }
}
