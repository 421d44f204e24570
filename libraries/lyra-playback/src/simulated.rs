//! Headless audio output driven by a virtual clock
//!
//! Behaves like a media element without producing sound: `load` resolves
//! metadata from the track record, `advance` moves the clock and emits
//! progress and end-of-track events. Handles are cheap clones sharing one
//! resource, so a driver can keep a handle after giving one to the
//! controller.

use crate::error::OutputError;
use crate::output::{clamp_seek, AudioOutput, OutputEvent};
use crate::types::{BindingId, PlaybackPosition};
use crate::volume::clamp_volume;
use crossbeam_channel::{unbounded, Receiver, Sender};
use lyra_core::Track;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct SimState {
    binding: Option<BindingId>,
    media_url: Option<String>,
    /// False when nothing is bound or the bound media failed to resolve
    loaded: bool,
    playing: bool,
    position: f64,
    duration: f64,
    volume: f32,
    autoplay_blocked: Option<String>,
    unresolvable: HashSet<String>,
    disposed: bool,
}

/// Simulated single-resource audio output
#[derive(Debug, Clone)]
pub struct SimulatedOutput {
    state: Arc<Mutex<SimState>>,
    events_tx: Sender<OutputEvent>,
    events_rx: Receiver<OutputEvent>,
}

impl SimulatedOutput {
    pub fn new() -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            state: Arc::new(Mutex::new(SimState {
                binding: None,
                media_url: None,
                loaded: false,
                playing: false,
                position: 0.0,
                duration: 0.0,
                volume: 1.0,
                autoplay_blocked: None,
                unresolvable: HashSet::new(),
                disposed: false,
            })),
            events_tx,
            events_rx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: OutputEvent) {
        // The receiver half lives in `self`, so the channel never disconnects
        self.events_tx.send(event).ok();
    }

    /// Make loads of `media_url` fail as if the file were missing
    pub fn fail_url(&self, media_url: impl Into<String>) {
        self.lock().unresolvable.insert(media_url.into());
    }

    /// Refuse `play()` with `reason`, or accept again with `None`
    pub fn set_autoplay_blocked(&self, reason: Option<String>) {
        self.lock().autoplay_blocked = reason;
    }

    /// Move the clock forward by `seconds` of playback
    ///
    /// Emits one progress event, and `Ended` once when the end is reached.
    pub fn advance(&self, seconds: f64) {
        let mut events = Vec::with_capacity(2);
        {
            let mut state = self.lock();
            let Some(binding) = state.binding else {
                return;
            };
            if state.disposed || !state.playing || seconds <= 0.0 {
                return;
            }

            state.position += seconds;
            let finished = state.duration > 0.0 && state.position >= state.duration;
            if finished {
                state.position = state.duration;
                state.playing = false;
            }

            events.push(OutputEvent::Progress {
                binding,
                current_time: state.position,
            });
            if finished {
                events.push(OutputEvent::Ended { binding });
            }
        }
        for event in events {
            self.emit(event);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    /// Media locator of the current binding
    pub fn media_url(&self) -> Option<String> {
        self.lock().media_url.clone()
    }

    pub fn binding(&self) -> Option<BindingId> {
        self.lock().binding
    }
}

impl Default for SimulatedOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for SimulatedOutput {
    fn load(&mut self, binding: BindingId, track: &Track) {
        let event = {
            let mut state = self.lock();
            if state.disposed {
                return;
            }

            state.binding = Some(binding);
            state.media_url = Some(track.media_url.clone());
            state.playing = false;
            state.position = 0.0;

            if state.unresolvable.contains(&track.media_url) {
                state.loaded = false;
                state.duration = 0.0;
                Some(OutputEvent::Error {
                    binding,
                    message: format!("cannot resolve {}", track.media_url),
                })
            } else {
                state.loaded = true;
                state.duration = track.duration_seconds;
                (track.duration_seconds > 0.0).then_some(OutputEvent::DurationKnown {
                    binding,
                    duration: track.duration_seconds,
                })
            }
        };
        if let Some(event) = event {
            self.emit(event);
        }
    }

    fn play(&mut self) -> Result<(), OutputError> {
        let mut state = self.lock();
        if state.disposed {
            return Err(OutputError::Disposed);
        }
        if !state.loaded {
            return Err(OutputError::NotLoaded);
        }
        if let Some(reason) = &state.autoplay_blocked {
            return Err(OutputError::Rejected(reason.clone()));
        }
        if state.duration > 0.0 && state.position >= state.duration {
            state.position = 0.0;
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.lock().playing = false;
    }

    fn seek(&mut self, seconds: f64) -> f64 {
        let mut state = self.lock();
        if !state.loaded {
            return state.position;
        }
        state.position = clamp_seek(seconds, state.duration);
        state.position
    }

    fn set_volume(&mut self, volume: f32) -> f32 {
        let mut state = self.lock();
        state.volume = clamp_volume(volume);
        state.volume
    }

    fn position(&self) -> PlaybackPosition {
        let state = self.lock();
        PlaybackPosition {
            current_time: state.position,
            duration: state.duration,
        }
    }

    fn events(&self) -> Receiver<OutputEvent> {
        self.events_rx.clone()
    }

    fn dispose(&mut self) {
        let mut state = self.lock();
        state.playing = false;
        state.loaded = false;
        state.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(duration: f64) -> Track {
        Track::new("t1", "Song", "Artist", "https://cdn/t1.mp3").with_duration(duration)
    }

    fn drain(output: &SimulatedOutput) -> Vec<OutputEvent> {
        output.events().try_iter().collect()
    }

    #[test]
    fn load_reports_duration() {
        let mut output = SimulatedOutput::new();
        output.load(BindingId(1), &track(120.0));

        assert_eq!(
            drain(&output),
            vec![OutputEvent::DurationKnown {
                binding: BindingId(1),
                duration: 120.0
            }]
        );
        assert_eq!(output.position().duration, 120.0);
    }

    #[test]
    fn unresolvable_media_reports_error_and_refuses_play() {
        let mut output = SimulatedOutput::new();
        output.fail_url("https://cdn/t1.mp3");
        output.load(BindingId(3), &track(120.0));

        let events = drain(&output);
        assert!(matches!(
            events.as_slice(),
            [OutputEvent::Error { binding: BindingId(3), .. }]
        ));
        assert_eq!(output.play(), Err(OutputError::NotLoaded));
    }

    #[test]
    fn ended_fires_once_at_the_end() {
        let mut output = SimulatedOutput::new();
        output.load(BindingId(1), &track(10.0));
        output.play().unwrap();
        drain(&output);

        output.advance(4.0);
        output.advance(7.0);
        output.advance(1.0);

        let events = drain(&output);
        let ended = events
            .iter()
            .filter(|e| matches!(e, OutputEvent::Ended { .. }))
            .count();
        assert_eq!(ended, 1);
        assert!(!output.is_playing());
        assert_eq!(output.position().current_time, 10.0);
    }

    #[test]
    fn pause_does_not_end() {
        let mut output = SimulatedOutput::new();
        output.load(BindingId(1), &track(10.0));
        output.play().unwrap();
        output.pause();
        output.advance(20.0);

        assert!(drain(&output)
            .iter()
            .all(|e| !matches!(e, OutputEvent::Ended { .. })));
    }

    #[test]
    fn autoplay_block_rejects_play() {
        let mut output = SimulatedOutput::new();
        output.load(BindingId(1), &track(10.0));
        output.set_autoplay_blocked(Some("user gesture required".to_string()));

        assert!(matches!(output.play(), Err(OutputError::Rejected(_))));
        assert!(!output.is_playing());

        output.set_autoplay_blocked(None);
        assert!(output.play().is_ok());
    }

    #[test]
    fn loading_replaces_previous_binding() {
        let mut output = SimulatedOutput::new();
        output.load(BindingId(1), &track(10.0));
        output.play().unwrap();
        output.advance(2.0);

        let next = Track::new("t2", "Other", "Artist", "https://cdn/t2.mp3").with_duration(5.0);
        output.load(BindingId(2), &next);

        assert!(!output.is_playing());
        assert_eq!(output.position().current_time, 0.0);
        assert_eq!(output.binding(), Some(BindingId(2)));
        assert_eq!(output.media_url().as_deref(), Some("https://cdn/t2.mp3"));
    }

    #[test]
    fn seek_and_volume_clamp() {
        let mut output = SimulatedOutput::new();
        output.load(BindingId(1), &track(30.0));

        assert_eq!(output.seek(45.0), 30.0);
        assert_eq!(output.seek(-1.0), 0.0);
        assert_eq!(output.set_volume(1.4), 1.0);
        assert_eq!(output.set_volume(-0.2), 0.0);
    }

    #[test]
    fn disposed_output_is_silent() {
        let mut output = SimulatedOutput::new();
        output.load(BindingId(1), &track(30.0));
        output.play().unwrap();
        output.dispose();
        output.dispose();

        assert!(output.is_disposed());
        assert_eq!(output.play(), Err(OutputError::Disposed));
        drain(&output);
        output.advance(5.0);
        assert!(drain(&output).is_empty());
    }
}
