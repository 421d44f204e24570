//! Lyra - Playback Engine
//!
//! Client-side playback engine for the Lyra streaming app.
//!
//! This crate provides:
//! - Navigable queue (wraparound, shuffle, originating source)
//! - Transport control (play/pause, next, previous with restart, seek)
//! - Volume control (linear 0.0-1.0, mute/unmute)
//! - Optimistic favorites with ordered remote reconciliation
//! - Fire-and-forget play history
//! - A headless simulated audio output
//!
//! # Architecture
//!
//! `lyra-playback` does not produce sound itself. The platform supplies an
//! [`AudioOutput`] that owns the one audio resource; the controller binds
//! tracks to it and consumes its events. Every binding is tagged with a
//! [`BindingId`] so late events from a replaced track are ignored.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use lyra_core::{FavoritesService, InMemoryFavorites, QueueSource, Track};
//! use lyra_playback::{
//!     FavoritesStore, PlaybackController, PlaybackStatus, PlayerConfig, SimulatedOutput,
//! };
//! use std::sync::Arc;
//!
//! let output = SimulatedOutput::new();
//! let favorites = FavoritesStore::new(
//!     Arc::new(InMemoryFavorites::new()) as Arc<dyn FavoritesService>
//! );
//! let mut controller =
//!     PlaybackController::new(PlayerConfig::default(), Box::new(output.clone()), favorites);
//!
//! let tracks = vec![
//!     Track::new("a", "Intro", "Artist", "/music/a.mp3").with_duration(90.0),
//!     Track::new("b", "Theme", "Artist", "/music/b.mp3").with_duration(200.0),
//! ];
//! controller
//!     .play_tracks(tracks, 0, Some(QueueSource::new("/album/7")))
//!     .unwrap();
//! assert_eq!(controller.status(), PlaybackStatus::Playing);
//!
//! // The platform reports the end of the track; the queue moves on
//! output.advance(90.0);
//! controller.pump_events();
//! assert_eq!(controller.state().current_track.as_ref().unwrap().title, "Theme");
//!
//! controller.set_volume(1.5); // clamped to 1.0
//! controller.toggle_play(); // pause
//! assert_eq!(controller.status(), PlaybackStatus::Paused);
//! ```

#![forbid(unsafe_code)]

mod controller;
mod error;
mod events;
mod favorites;
mod history;
mod output;
mod queue;
mod simulated;
pub mod types;
mod volume;

// Public exports
pub use controller::PlaybackController;
pub use error::{FavoritesError, OutputError, PlaybackError, Result};
pub use events::PlayerEvent;
pub use favorites::{FavoritesStore, PendingToggle};
pub use history::PlayHistoryRecorder;
pub use output::{clamp_seek, AudioOutput, OutputEvent};
pub use queue::QueueEngine;
pub use simulated::SimulatedOutput;
pub use types::{
    format_time, BindingId, Direction, PlaybackPosition, PlaybackState, PlaybackStatus,
    PlayerConfig, ReturnTarget,
};
pub use volume::{clamp_volume, Volume};
