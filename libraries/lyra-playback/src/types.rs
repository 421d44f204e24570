//! Core types for playback management

use lyra_core::{QueueSource, Track};
use serde::{Deserialize, Serialize};

/// Identifies one `load` on the audio output
///
/// Monotonically increasing per controller. Output events carry the binding
/// that produced them so stale events can be told apart from current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BindingId(pub u64);

/// Direction of a queue step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Next,
    Previous,
}

/// Coarse controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No current track
    Idle,

    /// A track is bound but not playing
    Paused,

    /// A track is bound and playing
    Playing,
}

/// State exposed to the UI
///
/// `current_track` and `liked` are projections of the queue and the
/// favorites store, refreshed by the controller after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Copy of the queue item under the cursor
    pub current_track: Option<Track>,

    /// Whether playback is requested and not failed
    pub is_playing: bool,

    /// Volume level in [0, 1], kept while muted
    pub volume: f32,

    /// Whether the current track is in the favorites set
    pub liked: bool,
}

impl PlaybackState {
    pub(crate) fn new(volume: f32) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            volume,
            liked: false,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        match (&self.current_track, self.is_playing) {
            (None, _) => PlaybackStatus::Idle,
            (Some(_), false) => PlaybackStatus::Paused,
            (Some(_), true) => PlaybackStatus::Playing,
        }
    }
}

/// Position of the bound track, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackPosition {
    pub current_time: f64,
    pub duration: f64,
}

impl PlaybackPosition {
    /// Progress in [0, 1] for the progress bar, 0 while the duration is unknown
    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Where "go to track source" should navigate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnTarget {
    /// The screen the queue was built from
    Source(QueueSource),

    /// No source was recorded, go to the configured fallback screen
    Fallback(String),
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume in [0, 1] (default: 0.7)
    pub initial_volume: f32,

    /// Seconds after which "previous" restarts the track instead (default: 3)
    pub restart_threshold_secs: f64,

    /// Record play history for signed-in users (default: true)
    pub record_history: bool,

    /// Return target when a queue has no source (default: "/recently-played")
    pub fallback_return_target: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.7,
            restart_threshold_secs: 3.0,
            record_history: true,
            fallback_return_target: "/recently-played".to_string(),
        }
    }
}

/// Format seconds as `m:ss` for the time labels
///
/// Negative and non-finite inputs render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.initial_volume, 0.7);
        assert_eq!(config.restart_threshold_secs, 3.0);
        assert!(config.record_history);
        assert_eq!(config.fallback_return_target, "/recently-played");
    }

    #[test]
    fn status_follows_projection() {
        let mut state = PlaybackState::new(0.7);
        assert_eq!(state.status(), PlaybackStatus::Idle);

        state.current_track = Some(Track::new("a", "A", "Artist", "u"));
        assert_eq!(state.status(), PlaybackStatus::Paused);

        state.is_playing = true;
        assert_eq!(state.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn fraction_handles_unknown_duration() {
        let pos = PlaybackPosition {
            current_time: 12.0,
            duration: 0.0,
        };
        assert_eq!(pos.fraction(), 0.0);

        let pos = PlaybackPosition {
            current_time: 30.0,
            duration: 120.0,
        };
        assert!((pos.fraction() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn time_labels() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(61.0), "1:01");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
    }
}
