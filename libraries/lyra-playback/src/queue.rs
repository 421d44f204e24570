//! Navigable playback queue
//!
//! Holds the ordered tracks eligible for playback, the cursor into them,
//! the shuffle flag and the source the queue was built from:
//!
//! ```text
//! source: /playlist/42
//! ─────────────────────────────
//!   0  Track A
//!   1  Track B   <- cursor
//!   2  Track C
//! ─────────────────────────────
//! next from 2 wraps to 0, previous from 0 wraps to 2
//! ```
//!
//! The queue is replaced wholesale by `set_queue`; only `cursor` and
//! `shuffle` change in place.

use crate::error::{PlaybackError, Result};
use crate::types::Direction;
use lyra_core::{QueueSource, Track};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Queue engine
///
/// Invariants: an empty queue has no cursor, and a set cursor is always a
/// valid index into `items`.
#[derive(Debug, Clone)]
pub struct QueueEngine {
    /// Tracks in play order, duplicates allowed
    items: Vec<Track>,

    /// Index of the current track
    cursor: Option<usize>,

    /// Whether steps pick a random index
    shuffle: bool,

    /// Where this queue was built from
    source: Option<QueueSource>,

    /// Randomness for shuffle steps
    rng: StdRng,
}

impl QueueEngine {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty queue with deterministic shuffle steps
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            shuffle: false,
            source: None,
            rng,
        }
    }

    /// Replace the queue and point the cursor at `start_index`
    ///
    /// Rejects an empty list or an out-of-range index before touching any
    /// state. Resets shuffle to off.
    pub fn set_queue(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        source: Option<QueueSource>,
    ) -> Result<&Track> {
        if tracks.is_empty() || start_index >= tracks.len() {
            return Err(PlaybackError::InvalidQueue {
                len: tracks.len(),
                start_index,
            });
        }

        self.items = tracks;
        self.cursor = Some(start_index);
        self.shuffle = false;
        self.source = source;

        Ok(&self.items[start_index])
    }

    /// Replace the queue with a single track
    pub fn set_single(&mut self, track: Track, source: Option<QueueSource>) -> &Track {
        self.items = vec![track];
        self.cursor = Some(0);
        self.shuffle = false;
        self.source = source;
        &self.items[0]
    }

    /// Replace the queue without selecting a track
    ///
    /// Playback later starts at the first item.
    pub fn stage(&mut self, tracks: Vec<Track>, source: Option<QueueSource>) -> Result<()> {
        if tracks.is_empty() {
            return Err(PlaybackError::InvalidQueue {
                len: 0,
                start_index: 0,
            });
        }

        self.items = tracks;
        self.cursor = None;
        self.shuffle = false;
        self.source = source;
        Ok(())
    }

    /// Move the cursor to `index`
    pub fn select(&mut self, index: usize) -> Option<&Track> {
        if index < self.items.len() {
            self.cursor = Some(index);
            self.items.get(index)
        } else {
            None
        }
    }

    /// Step the cursor and return the new current track
    ///
    /// With shuffle on, picks a uniformly random index regardless of
    /// direction and cursor; the current track may come up again. With
    /// shuffle off, moves by one and wraps at both ends. An empty queue is
    /// a no-op.
    pub fn advance(&mut self, direction: Direction) -> Option<&Track> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }

        let index = if self.shuffle {
            self.rng.gen_range(0..len)
        } else {
            match (self.cursor, direction) {
                (None, Direction::Next) => 0,
                (None, Direction::Previous) => len - 1,
                (Some(cursor), Direction::Next) => (cursor + 1) % len,
                (Some(cursor), Direction::Previous) => (cursor + len - 1) % len,
            }
        };

        debug!(
            from = ?self.cursor,
            to = index,
            shuffle = self.shuffle,
            ?direction,
            "Queue cursor moved"
        );
        self.cursor = Some(index);
        self.items.get(index)
    }

    /// Flip shuffle, returns the new flag
    ///
    /// Neither reorders the items nor moves the cursor.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|index| self.items.get(index))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn items(&self) -> &[Track] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    pub fn source(&self) -> Option<&QueueSource> {
        self.source.as_ref()
    }
}

impl Default for QueueEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_track(id: &str) -> Track {
        Track::new(id, format!("Track {}", id), "Test Artist", format!("/music/{}.mp3", id))
            .with_duration(180.0)
    }

    fn abc() -> Vec<Track> {
        vec![
            create_test_track("A"),
            create_test_track("B"),
            create_test_track("C"),
        ]
    }

    fn current_id(queue: &QueueEngine) -> Option<&str> {
        queue.current().map(|t| t.id.as_str())
    }

    #[test]
    fn create_empty_queue() {
        let queue = QueueEngine::new();
        assert!(queue.is_empty());
        assert_eq!(queue.cursor(), None);
        assert!(queue.current().is_none());
    }

    #[test]
    fn set_queue_points_at_start_index() {
        let mut queue = QueueEngine::new();
        let current = queue
            .set_queue(abc(), 1, Some(QueueSource::new("/playlist/1")))
            .unwrap();

        assert_eq!(current.id.as_str(), "B");
        assert_eq!(queue.cursor(), Some(1));
        assert_eq!(queue.source().map(|s| s.as_str()), Some("/playlist/1"));
    }

    #[test]
    fn invalid_queue_leaves_state_untouched() {
        let mut queue = QueueEngine::new();
        queue.set_queue(abc(), 2, None).unwrap();
        queue.toggle_shuffle();

        assert_eq!(
            queue.set_queue(Vec::new(), 0, None).unwrap_err(),
            PlaybackError::InvalidQueue {
                len: 0,
                start_index: 0
            }
        );
        assert!(queue.set_queue(abc(), 3, None).is_err());

        assert_eq!(queue.cursor(), Some(2));
        assert!(queue.is_shuffled());
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn set_queue_resets_shuffle() {
        let mut queue = QueueEngine::new();
        queue.set_queue(abc(), 0, None).unwrap();
        queue.toggle_shuffle();

        queue.set_queue(abc(), 0, None).unwrap();
        assert!(!queue.is_shuffled());
    }

    #[test]
    fn set_single_is_one_item_queue() {
        let mut queue = QueueEngine::new();
        queue.set_single(create_test_track("X"), Some(QueueSource::new("/search")));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.cursor(), Some(0));
        assert_eq!(current_id(&queue), Some("X"));
    }

    #[test]
    fn wraparound_navigation() {
        let mut queue = QueueEngine::new();
        queue.set_queue(abc(), 1, None).unwrap();

        assert_eq!(queue.advance(Direction::Next).unwrap().id.as_str(), "C");
        assert_eq!(queue.advance(Direction::Next).unwrap().id.as_str(), "A");
        assert_eq!(queue.advance(Direction::Previous).unwrap().id.as_str(), "C");
    }

    #[test]
    fn advance_on_empty_queue_is_noop() {
        let mut queue = QueueEngine::new();
        assert!(queue.advance(Direction::Next).is_none());
        assert!(queue.advance(Direction::Previous).is_none());
        assert_eq!(queue.cursor(), None);
    }

    #[test]
    fn staged_queue_starts_from_edges() {
        let mut queue = QueueEngine::new();
        queue.stage(abc(), None).unwrap();
        assert!(queue.current().is_none());

        assert_eq!(queue.clone().advance(Direction::Next).unwrap().id.as_str(), "A");
        assert_eq!(queue.advance(Direction::Previous).unwrap().id.as_str(), "C");
    }

    #[test]
    fn shuffle_toggle_keeps_cursor_and_order() {
        let mut queue = QueueEngine::new();
        queue.set_queue(abc(), 2, None).unwrap();

        assert!(queue.toggle_shuffle());
        assert_eq!(queue.cursor(), Some(2));
        let ids: Vec<&str> = queue.items().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);

        assert!(!queue.toggle_shuffle());
    }

    #[test]
    fn shuffle_steps_may_repeat_current() {
        let mut queue = QueueEngine::with_seed(42);
        queue.set_queue(abc(), 0, None).unwrap();
        queue.toggle_shuffle();

        let mut repeated = false;
        for _ in 0..200 {
            let before = queue.cursor();
            queue.advance(Direction::Next);
            repeated |= queue.cursor() == before;
        }
        assert!(repeated, "uniform pick over 3 items should repeat within 200 steps");
    }

    #[test]
    fn duplicates_are_kept() {
        let mut queue = QueueEngine::new();
        let tracks = vec![create_test_track("A"), create_test_track("A")];
        queue.set_queue(tracks, 0, None).unwrap();

        assert_eq!(queue.len(), 2);
        queue.advance(Direction::Next);
        assert_eq!(queue.cursor(), Some(1));
    }
}
