//! Player Events
//!
//! Event-based communication for UI synchronization. The controller buffers
//! events as it mutates state; the UI drains them after each intent or
//! event pump:
//! - State changes (idle/paused/playing)
//! - Track changes (every new binding)
//! - Position updates (mirrored from the audio output)
//! - Volume, shuffle and like changes
//! - Non-fatal errors to display

use crate::types::PlaybackStatus;
use lyra_core::{QueueSource, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Coarse playback state changed
    StateChanged {
        /// The new playback state
        status: PlaybackStatus,
    },

    /// A different queue item is now current
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Position update, at the cadence the output reports it
    PositionUpdate {
        /// Current playback position in seconds
        current_time: f64,
        /// Duration in seconds, 0 while unknown
        duration: f64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Shuffle toggled
    ShuffleChanged { enabled: bool },

    /// Liked flag of the current track changed
    LikeChanged { track_id: TrackId, liked: bool },

    /// Queue replaced
    QueueChanged {
        /// New queue length
        length: usize,
        /// Where the queue was built from
        source: Option<QueueSource>,
    },

    /// Non-fatal error for the UI to display
    Error {
        /// Error message
        message: String,
    },
}
