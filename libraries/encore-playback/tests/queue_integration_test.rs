//! Queue management integration tests
//!
//! Drives the playback state machine directly (no tasks) through the
//! scenarios a listener produces: playing an album from the middle, skipping,
//! editing the queue while something plays.

mod common;

use common::create_test_track;
use encore_core::TrackId;
use encore_playback::{
    EndOfQueuePolicy, MediaPlayerManager, PlatformEvent, PlaybackConfig, PlaybackError,
    PlaybackStatus, QueueItemId,
};
use std::sync::Arc;

// ===== Test Helpers =====

fn manager_with_album(start: usize) -> MediaPlayerManager {
    let mut manager = MediaPlayerManager::new(PlaybackConfig::default());
    let album: Vec<_> = (1..=5).map(create_test_track).collect();
    manager.set_playback_queue(album, start).unwrap();
    prepare(&mut manager);
    manager
}

fn current_item(manager: &MediaPlayerManager) -> QueueItemId {
    manager.state().current_item.as_ref().unwrap().id()
}

fn current_track(manager: &MediaPlayerManager) -> Option<u64> {
    manager.state().current_track().map(|track| track.id().get())
}

fn prepare(manager: &mut MediaPlayerManager) {
    let item_id = current_item(manager);
    let generation = manager.state().load_generation;
    manager.handle_platform_event(PlatformEvent::Prepared {
        item_id,
        generation,
        duration_ms: Some(30_000),
    });
}

fn complete(manager: &mut MediaPlayerManager) {
    let item_id = current_item(manager);
    let generation = manager.state().load_generation;
    manager.handle_platform_event(PlatformEvent::Completed {
        item_id,
        generation,
    });
}

// ===== Queue Creation =====

#[test]
fn play_album_from_middle() {
    let manager = manager_with_album(2);
    let state = manager.state();

    assert_eq!(state.queue.len(), 5);
    assert_eq!(state.queue_index, Some(2));
    assert_eq!(current_track(&manager), Some(3));
    assert!(state.is_playing());
}

#[test]
fn empty_queue_add_does_not_autoplay() {
    let mut manager = MediaPlayerManager::new(PlaybackConfig::default());
    let track = create_test_track(1);

    manager.add_track_to_queue(Arc::clone(&track));
    assert_eq!(manager.state().current_track(), Some(&track));
    assert!(!manager.state().is_playing());
    assert!(!manager.play_when_ready());

    prepare(&mut manager);
    assert_eq!(manager.state().status, PlaybackStatus::Paused);
}

#[test]
fn add_while_playing_appends_without_interrupting() {
    let mut manager = manager_with_album(0);
    let generation = manager.state().load_generation;

    manager.add_track_to_queue(create_test_track(9));

    assert_eq!(manager.state().queue.len(), 6);
    assert_eq!(current_track(&manager), Some(1));
    assert!(manager.state().is_playing());
    assert_eq!(manager.state().load_generation, generation);
}

#[test]
fn insert_next_plays_after_current() {
    let mut manager = manager_with_album(0);
    manager.insert_next(create_test_track(9));

    complete(&mut manager);
    assert_eq!(current_track(&manager), Some(9));
    assert_eq!(manager.state().status, PlaybackStatus::Loading);
}

// ===== Navigation =====

#[test]
fn completion_advances_to_next_item() {
    let mut manager = MediaPlayerManager::new(PlaybackConfig::default());
    let tracks = vec![create_test_track(1), create_test_track(2), create_test_track(3)];
    manager.set_playback_queue(tracks, 1).unwrap();
    prepare(&mut manager);

    complete(&mut manager);

    let state = manager.state();
    assert_eq!(state.queue_index, Some(2));
    assert_eq!(current_track(&manager), Some(3));
    assert_eq!(state.status, PlaybackStatus::Loading);
    assert_eq!(state.position_ms, 0);
}

#[test]
fn completion_of_last_item_goes_idle() {
    let mut manager = manager_with_album(4);
    complete(&mut manager);

    let state = manager.state();
    assert_eq!(state.status, PlaybackStatus::Idle);
    assert!(state.current_item.is_none());
    assert_eq!(state.queue_index, None);
    assert_eq!(state.queue.len(), 5);
}

#[test]
fn next_and_previous_buttons() {
    let mut manager = manager_with_album(0);

    manager.play_next().unwrap();
    assert_eq!(current_track(&manager), Some(2));
    prepare(&mut manager);
    assert!(manager.state().is_playing());

    manager.play_previous().unwrap();
    assert_eq!(current_track(&manager), Some(1));

    // Already on the first item: nothing to reload
    prepare(&mut manager);
    let generation = manager.state().load_generation;
    manager.play_previous().unwrap();
    assert_eq!(current_track(&manager), Some(1));
    assert_eq!(manager.state().load_generation, generation);
}

#[test]
fn next_on_last_item_with_stay_policy_keeps_playing() {
    let mut manager = MediaPlayerManager::new(PlaybackConfig {
        end_of_queue: EndOfQueuePolicy::Stay,
        ..PlaybackConfig::default()
    });
    manager
        .set_playback_queue(vec![create_test_track(1)], 0)
        .unwrap();
    prepare(&mut manager);

    manager.play_next().unwrap();
    assert!(manager.state().is_playing());
    assert_eq!(current_track(&manager), Some(1));
}

// ===== Editing =====

#[test]
fn removing_current_item_loads_following_one() {
    let mut manager = manager_with_album(1);
    let current = current_item(&manager);

    manager.remove_from_queue(current).unwrap();

    assert_eq!(current_track(&manager), Some(3));
    assert_eq!(manager.state().status, PlaybackStatus::Loading);
    assert!(manager.play_when_ready());
}

#[test]
fn removing_other_item_keeps_playback() {
    let mut manager = manager_with_album(2);
    let first = manager.state().queue[0].id();

    manager.remove_from_queue(first).unwrap();

    assert_eq!(manager.state().queue_index, Some(1));
    assert_eq!(current_track(&manager), Some(3));
    assert!(manager.state().is_playing());
}

#[test]
fn removing_unknown_item_is_an_error() {
    let mut manager = manager_with_album(0);
    let stale = current_item(&manager);
    manager
        .set_playback_queue(vec![create_test_track(8)], 0)
        .unwrap();

    assert!(matches!(
        manager.remove_from_queue(stale),
        Err(PlaybackError::ItemNotFound(id)) if id == stale
    ));
}

#[test]
fn moving_items_never_changes_current() {
    let mut manager = manager_with_album(0);
    let current = current_item(&manager);

    manager.move_queue_item(0, 4).unwrap();
    assert_eq!(current_item(&manager), current);
    assert_eq!(manager.state().queue_index, Some(4));

    let err = manager.move_queue_item(0, 9).unwrap_err();
    assert!(matches!(err, PlaybackError::IndexOutOfBounds { index: 9, len: 5 }));
}

#[test]
fn repeated_track_items_are_distinct() {
    let mut manager = MediaPlayerManager::new(PlaybackConfig::default());
    let same = create_test_track(4);
    manager
        .set_playback_queue(vec![Arc::clone(&same), Arc::clone(&same)], 0)
        .unwrap();
    prepare(&mut manager);
    let first = current_item(&manager);

    manager.play_next().unwrap();
    assert_ne!(current_item(&manager), first);
    assert_eq!(
        manager.state().current_track().map(|t| t.id()),
        Some(TrackId::new(4))
    );
    assert_eq!(manager.state().status, PlaybackStatus::Loading);
}

#[test]
fn clear_queue_goes_idle() {
    let mut manager = manager_with_album(3);
    manager.clear_queue().unwrap();

    let state = manager.state();
    assert_eq!(state.status, PlaybackStatus::Idle);
    assert!(state.queue.is_empty());
    assert_eq!(state.duration_ms, 0);
}

#[test]
fn replacing_queue_with_other_track_restarts() {
    let mut manager = manager_with_album(0);
    let generation = manager.state().load_generation;

    manager
        .set_playback_queue(vec![create_test_track(7), create_test_track(8)], 1)
        .unwrap();

    assert_eq!(current_track(&manager), Some(8));
    assert_eq!(manager.state().status, PlaybackStatus::Loading);
    assert_eq!(manager.state().load_generation, generation + 1);
}

#[test]
fn empty_queue_replacement_goes_idle() {
    let mut manager = manager_with_album(0);
    manager
        .set_playback_queue(Vec::<Arc<encore_core::Track>>::new(), 0)
        .unwrap();

    assert_eq!(manager.state().status, PlaybackStatus::Idle);
    assert!(manager.state().queue.is_empty());
}
