//! Platform-agnostic audio output trait
//!
//! Abstracts the single audio decode/playback resource (a browser media
//! element, a CPAL stream, a simulated clock) behind load/play/pause/seek.

use crate::error::OutputError;
use crate::types::{BindingId, PlaybackPosition};
use crossbeam_channel::Receiver;
use lyra_core::Track;

/// Asynchronous notification from the audio output
///
/// Every event names the binding that produced it. Progress cadence is
/// platform-determined and not uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Playback position moved
    Progress { binding: BindingId, current_time: f64 },

    /// Metadata resolved, duration is now authoritative
    DurationKnown { binding: BindingId, duration: f64 },

    /// Playback reached the end; never sent for a pause
    Ended { binding: BindingId },

    /// The bound media could not be resolved or decoded
    Error { binding: BindingId, message: String },
}

impl OutputEvent {
    pub fn binding(&self) -> BindingId {
        match self {
            OutputEvent::Progress { binding, .. }
            | OutputEvent::DurationKnown { binding, .. }
            | OutputEvent::Ended { binding }
            | OutputEvent::Error { binding, .. } => *binding,
        }
    }
}

/// Platform-agnostic audio output
///
/// Owns exactly one underlying audio resource. Loading a new track stops the
/// previous one; two bindings are never audible at the same time.
pub trait AudioOutput: Send {
    /// Bind the output to `track.media_url`
    ///
    /// Never fails synchronously: resolution or decoding failures arrive as
    /// `OutputEvent::Error` for `binding`, leaving the output stopped.
    fn load(&mut self, binding: BindingId, track: &Track);

    /// Request playback of the bound media
    ///
    /// # Returns
    /// * `Ok(())` - Playback started
    /// * `Err(_)` - Nothing bound, or the platform refused (autoplay policy)
    fn play(&mut self) -> Result<(), OutputError>;

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Seek within the bound media, returns the clamped position
    fn seek(&mut self, seconds: f64) -> f64;

    /// Set output volume, returns the clamped level
    fn set_volume(&mut self, volume: f32) -> f32;

    /// Current position and duration of the bound media
    fn position(&self) -> PlaybackPosition;

    /// Event stream for this output
    fn events(&self) -> Receiver<OutputEvent>;

    /// Release the underlying resource
    ///
    /// Must be idempotent. After disposal `play` fails with
    /// `OutputError::Disposed` and no further events are sent.
    fn dispose(&mut self);
}

/// Clamp a seek target into [0, duration]
///
/// NaN seeks to the start.
pub fn clamp_seek(seconds: f64, duration: f64) -> f64 {
    if seconds.is_nan() {
        return 0.0;
    }
    seconds.clamp(0.0, duration.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_is_clamped_to_duration() {
        assert_eq!(clamp_seek(-1.0, 100.0), 0.0);
        assert_eq!(clamp_seek(40.0, 100.0), 40.0);
        assert_eq!(clamp_seek(140.0, 100.0), 100.0);
        assert_eq!(clamp_seek(f64::NAN, 100.0), 0.0);
        assert_eq!(clamp_seek(5.0, 0.0), 0.0);
    }

    #[test]
    fn every_event_names_its_binding() {
        let binding = BindingId(7);
        let events = [
            OutputEvent::Progress {
                binding,
                current_time: 1.0,
            },
            OutputEvent::DurationKnown {
                binding,
                duration: 2.0,
            },
            OutputEvent::Ended { binding },
            OutputEvent::Error {
                binding,
                message: "404".to_string(),
            },
        ];
        assert!(events.iter().all(|e| e.binding() == binding));
    }
}
