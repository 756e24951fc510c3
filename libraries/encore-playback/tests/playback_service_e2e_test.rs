//! End-to-end tests: manager, bridge and transport pump running together
//! against a recording platform player and media session.

mod common;

use common::{
    create_test_track, eventually, locator, wait_for_state, FakeArtwork, FakePlayer,
    FakeSession, PlayerCall, PlayerProbe,
};
use encore_core::TrackId;
use encore_playback::{
    NowPlayingArtwork, PlatformEvent, PlaybackConfig, PlaybackError, PlaybackService,
    PlaybackStatus, TransportCommand, PLATFORM_COMMAND_FAILED,
};

struct Harness {
    service: PlaybackService,
    probe: PlayerProbe,
    session: FakeSession,
    artwork: FakeArtwork,
}

fn start_with(artwork: FakeArtwork) -> Harness {
    let probe = PlayerProbe::default();
    let session = FakeSession::default();

    let service = PlaybackService::start(
        PlaybackConfig::default(),
        |events| FakePlayer::new(&probe, events),
        |_transport| session.clone(),
        artwork.clone(),
    );

    Harness {
        service,
        probe,
        session,
        artwork,
    }
}

fn start() -> Harness {
    start_with(FakeArtwork::default())
}

#[tokio::test]
async fn double_toggle_pauses_and_resumes_without_reload() {
    let h = start();
    let mut states = h.service.subscribe();
    let handle = h.service.handle().clone();
    let track = create_test_track(1);

    handle.toggle_playback(track.clone()).await.unwrap();
    wait_for_state(&mut states, |s| s.is_playing()).await;
    eventually(|| h.probe.count(&PlayerCall::Play) == 1).await;

    handle.toggle_playback(track.clone()).await.unwrap();
    wait_for_state(&mut states, |s| s.status == PlaybackStatus::Paused).await;
    eventually(|| h.probe.count(&PlayerCall::Pause) == 1).await;

    handle.toggle_playback(track).await.unwrap();
    wait_for_state(&mut states, |s| s.is_playing()).await;
    eventually(|| h.probe.count(&PlayerCall::Play) == 2).await;

    assert_eq!(h.probe.loads(), vec![locator(1)]);
    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn added_track_is_prepared_but_not_played() {
    let h = start();
    let mut states = h.service.subscribe();

    h.service
        .handle()
        .add_track_to_queue(create_test_track(7))
        .await
        .unwrap();

    let state = wait_for_state(&mut states, |s| s.status == PlaybackStatus::Paused).await;
    assert_eq!(state.current_track().unwrap().id(), TrackId::new(7));
    assert!(!state.is_playing());

    eventually(|| h.probe.count(&PlayerCall::Prepare) == 1).await;
    assert_eq!(h.probe.count(&PlayerCall::Play), 0);

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn completion_moves_to_next_item() {
    let h = start();
    let mut states = h.service.subscribe();
    let tracks = vec![create_test_track(1), create_test_track(2), create_test_track(3)];

    h.service
        .handle()
        .set_playback_queue(tracks, 1)
        .await
        .unwrap();
    let state = wait_for_state(&mut states, |s| s.is_playing()).await;
    let b = state.current_item.unwrap().id();

    h.probe
        .emit(PlatformEvent::Completed {
            item_id: b,
            generation: state.load_generation,
        })
        .await;

    let state = wait_for_state(&mut states, |s| {
        s.current_track().map(|t| t.id()) == Some(TrackId::new(3))
    })
    .await;
    assert_eq!(state.queue_index, Some(2));

    wait_for_state(&mut states, |s| s.is_playing()).await;
    assert_eq!(h.probe.loads(), vec![locator(2), locator(3)]);

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn completion_of_last_item_goes_idle_and_clears_session() {
    let h = start();
    let mut states = h.service.subscribe();

    h.service
        .handle()
        .toggle_playback(create_test_track(1))
        .await
        .unwrap();
    let state = wait_for_state(&mut states, |s| s.is_playing()).await;
    let item_id = state.current_item.unwrap().id();
    eventually(|| !h.session.published().is_empty()).await;

    h.probe
        .emit(PlatformEvent::Completed {
            item_id,
            generation: state.load_generation,
        })
        .await;

    let state = wait_for_state(&mut states, |s| s.status == PlaybackStatus::Idle).await;
    assert!(state.current_item.is_none());
    assert_eq!(state.queue_index, None);

    eventually(|| h.probe.count(&PlayerCall::Stop) == 1).await;
    eventually(|| h.session.clears() == 1).await;

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn failed_prepare_is_retried_on_toggle() {
    let h = start();
    let mut states = h.service.subscribe();
    let track = create_test_track(9);
    h.probe.fail_prepare(&locator(9));

    h.service
        .handle()
        .toggle_playback(track.clone())
        .await
        .unwrap();

    let state = wait_for_state(&mut states, |s| s.status == PlaybackStatus::Errored).await;
    assert!(!state.is_playing());
    assert_eq!(state.error.as_ref().unwrap().code, 404);
    assert_eq!(state.current_track().unwrap().id(), TrackId::new(9));

    h.probe.heal(&locator(9));
    h.service.handle().toggle_playback(track).await.unwrap();

    let state = wait_for_state(&mut states, |s| s.is_playing()).await;
    assert!(state.error.is_none());
    assert_eq!(h.probe.loads(), vec![locator(9), locator(9)]);

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn late_error_from_failed_attempt_does_not_hit_retry() {
    let h = start();
    let mut states = h.service.subscribe();
    let track = create_test_track(11);
    h.probe.fail_prepare(&locator(11));

    h.service
        .handle()
        .toggle_playback(track.clone())
        .await
        .unwrap();
    let failed = wait_for_state(&mut states, |s| s.status == PlaybackStatus::Errored).await;
    let item_id = failed.current_item.as_ref().unwrap().id();

    h.probe.heal(&locator(11));
    h.service.handle().toggle_playback(track).await.unwrap();
    let playing = wait_for_state(&mut states, |s| s.is_playing()).await;
    assert_eq!(playing.load_generation, failed.load_generation + 1);

    h.probe
        .emit(PlatformEvent::Error {
            item_id,
            generation: failed.load_generation,
            code: 404,
            message: "preview not found".to_string(),
        })
        .await;
    h.probe
        .emit(PlatformEvent::Position {
            item_id,
            generation: playing.load_generation,
            position_ms: 1_234,
        })
        .await;

    let state = wait_for_state(&mut states, |s| s.position_ms == 1_234).await;
    assert_eq!(state.status, PlaybackStatus::Playing);
    assert!(state.error.is_none());

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn failed_load_command_becomes_errored_state() {
    let h = start();
    let mut states = h.service.subscribe();
    h.probe.fail_load(&locator(4));

    h.service
        .handle()
        .toggle_playback(create_test_track(4))
        .await
        .unwrap();

    let state = wait_for_state(&mut states, |s| s.status == PlaybackStatus::Errored).await;
    let failure = state.error.unwrap();
    assert_eq!(failure.code, PLATFORM_COMMAND_FAILED);
    assert!(failure.message.contains("unsupported locator"));

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn explicit_seek_reaches_platform() {
    let h = start();
    let mut states = h.service.subscribe();
    let handle = h.service.handle().clone();

    handle.toggle_playback(create_test_track(1)).await.unwrap();
    wait_for_state(&mut states, |s| s.is_playing()).await;

    handle.seek_to(12_500).await.unwrap();
    eventually(|| h.probe.count(&PlayerCall::Seek(12_500)) == 1).await;

    handle.seek_to(99_000).await.unwrap();
    eventually(|| h.probe.count(&PlayerCall::Seek(30_000)) == 1).await;

    assert!(handle.state().is_playing());
    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn seek_while_loading_is_rejected() {
    let h = start();
    let handle = h.service.handle().clone();
    h.probe.fail_load(&locator(1));

    // Loading is the state right after the toggle returns
    handle.toggle_playback(create_test_track(1)).await.unwrap();
    let result = handle.seek_to(1000).await;

    assert!(matches!(
        result,
        Err(PlaybackError::InvalidState(
            PlaybackStatus::Loading | PlaybackStatus::Errored
        ))
    ));
    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn now_playing_is_published_with_artwork() {
    let h = start();
    let mut states = h.service.subscribe();

    h.service
        .handle()
        .toggle_playback(create_test_track(5))
        .await
        .unwrap();
    wait_for_state(&mut states, |s| s.is_playing()).await;

    eventually(|| {
        h.session
            .last_published()
            .is_some_and(|now_playing| now_playing.is_playing())
    })
    .await;

    let now_playing = h.session.last_published().unwrap();
    assert_eq!(now_playing.title, "Track 5");
    assert_eq!(now_playing.artist, "Artist 5");
    assert!(matches!(now_playing.artwork, NowPlayingArtwork::Image(_)));
    assert_eq!(
        h.artwork.requests(),
        vec!["https://img.example.com/5.jpg".to_string()]
    );

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn broken_artwork_falls_back_to_placeholder() {
    let h = start_with(FakeArtwork::broken());
    let mut states = h.service.subscribe();

    h.service
        .handle()
        .toggle_playback(create_test_track(5))
        .await
        .unwrap();
    wait_for_state(&mut states, |s| s.is_playing()).await;

    eventually(|| {
        h.session
            .last_published()
            .is_some_and(|now_playing| now_playing.is_playing())
    })
    .await;
    assert!(h.session.last_published().unwrap().artwork.is_placeholder());

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn transport_commands_drive_the_manager() {
    let h = start();
    let mut states = h.service.subscribe();
    let transport = h.service.transport();

    h.service
        .handle()
        .set_playback_queue(vec![create_test_track(1), create_test_track(2)], 0)
        .await
        .unwrap();
    wait_for_state(&mut states, |s| s.is_playing()).await;

    transport.send(TransportCommand::TogglePlayPause).await.unwrap();
    wait_for_state(&mut states, |s| s.status == PlaybackStatus::Paused).await;

    transport.send(TransportCommand::Next).await.unwrap();
    let state = wait_for_state(&mut states, |s| {
        s.current_track().map(|t| t.id()) == Some(TrackId::new(2))
            && s.status == PlaybackStatus::Paused
    })
    .await;
    assert_eq!(state.queue_index, Some(1));

    transport.send(TransportCommand::Stop).await.unwrap();
    wait_for_state(&mut states, |s| s.status == PlaybackStatus::Idle).await;
    eventually(|| h.probe.loaded_item().is_none()).await;

    h.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_releases_player_and_ends_state_stream() {
    let h = start();
    let mut states = h.service.subscribe();
    let handle = h.service.handle().clone();

    handle.toggle_playback(create_test_track(1)).await.unwrap();
    wait_for_state(&mut states, |s| s.is_playing()).await;

    h.service.shutdown().await.unwrap();

    let calls = h.probe.calls();
    assert_eq!(calls.last(), Some(&PlayerCall::Release));
    assert!(calls.contains(&PlayerCall::Stop));
    assert_eq!(h.session.clears(), 1);

    // Drain anything published before the manager stopped; then the stream ends
    while states.changed().await.is_ok() {}
    assert!(matches!(
        handle.play().await,
        Err(PlaybackError::ServiceStopped)
    ));
    assert!(handle.is_stopped());
}
