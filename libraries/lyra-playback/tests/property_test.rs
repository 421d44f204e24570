//! Property-based tests for queue navigation and volume
//!
//! Uses proptest to verify invariants across many random inputs.

use lyra_core::{FavoritesService, InMemoryFavorites, Track};
use lyra_playback::{
    clamp_volume, Direction, FavoritesStore, PlaybackController, PlayerConfig, QueueEngine,
    SimulatedOutput,
};
use proptest::prelude::*;
use std::sync::Arc;

// ===== Helpers =====

fn arbitrary_track() -> impl Strategy<Value = Track> {
    (
        "[a-z0-9]{1,10}",  // id
        "[A-Za-z ]{1,30}", // title
        "[A-Za-z ]{1,20}", // artist
        1u32..600,         // duration (1-600 seconds)
    )
        .prop_map(|(id, title, artist, duration)| {
            let url = format!("/music/{}.mp3", id);
            Track::new(id, title, artist, url).with_duration(f64::from(duration))
        })
}

fn arbitrary_tracks() -> impl Strategy<Value = Vec<Track>> {
    prop::collection::vec(arbitrary_track(), 1..30)
}

fn tracks_with_index() -> impl Strategy<Value = (Vec<Track>, usize)> {
    arbitrary_tracks().prop_flat_map(|tracks| {
        let len = tracks.len();
        (Just(tracks), 0..len)
    })
}

fn controller(seed: u64) -> PlaybackController {
    let favorites =
        FavoritesStore::new(Arc::new(InMemoryFavorites::new()) as Arc<dyn FavoritesService>);
    PlaybackController::new(
        PlayerConfig::default(),
        Box::new(SimulatedOutput::new()),
        favorites,
    )
    .with_queue(QueueEngine::with_seed(seed))
}

// ===== Property Tests =====

proptest! {
    /// Property: play_tracks makes the requested item current and playing
    #[test]
    fn play_tracks_selects_start_index((tracks, index) in tracks_with_index()) {
        let mut controller = controller(0);
        let expected = tracks[index].clone();

        controller.play_tracks(tracks, index, None).unwrap();

        prop_assert_eq!(controller.state().current_track.as_ref(), Some(&expected));
        prop_assert!(controller.state().is_playing);
        prop_assert_eq!(controller.queue().cursor(), Some(index));
    }

    /// Property: len steps forward return to the starting item
    #[test]
    fn next_cycle_is_closed((tracks, index) in tracks_with_index()) {
        let len = tracks.len();
        let mut queue = QueueEngine::new();
        queue.set_queue(tracks, index, None).unwrap();

        for _ in 0..len {
            queue.advance(Direction::Next);
        }
        prop_assert_eq!(queue.cursor(), Some(index));
    }

    /// Property: next then previous is the identity without shuffle
    #[test]
    fn next_then_previous_round_trips((tracks, index) in tracks_with_index()) {
        let mut queue = QueueEngine::new();
        queue.set_queue(tracks, index, None).unwrap();

        queue.advance(Direction::Next);
        queue.advance(Direction::Previous);
        prop_assert_eq!(queue.cursor(), Some(index));
    }

    /// Property: shuffle steps always land inside the queue
    #[test]
    fn shuffle_stays_in_bounds(
        (tracks, index) in tracks_with_index(),
        seed in any::<u64>(),
        steps in 1usize..50,
    ) {
        let len = tracks.len();
        let mut controller = controller(seed);
        controller.play_tracks(tracks.clone(), index, None).unwrap();
        controller.toggle_shuffle();

        for _ in 0..steps {
            let track = controller.next().unwrap();
            prop_assert!(tracks.contains(&track));
            prop_assert!(controller.queue().cursor().is_some_and(|c| c < len));
        }
    }

    /// Property: out-of-range start index never mutates the queue
    #[test]
    fn invalid_start_is_rejected(tracks in arbitrary_tracks(), extra in 0usize..10) {
        let mut controller = controller(0);
        let len = tracks.len();

        prop_assert!(controller.play_tracks(tracks, len + extra, None).is_err());
        prop_assert!(controller.queue().is_empty());
        prop_assert!(controller.state().current_track.is_none());
    }

    /// Property: applied volume is always within [0, 1]
    #[test]
    fn volume_is_always_in_range(level in prop::num::f32::ANY) {
        let mut controller = controller(0);
        let applied = controller.set_volume(level);

        prop_assert!((0.0..=1.0).contains(&applied));
        prop_assert_eq!(applied, clamp_volume(level));
        prop_assert_eq!(controller.state().volume, applied);
    }
}
