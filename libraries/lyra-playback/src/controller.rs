//! Playback controller - core orchestration
//!
//! Binds the queue, the audio output and the favorites store into the one
//! surface the UI talks to. Intents (`play_tracks`, `next`, `toggle_like`,
//! ...) are expected to arrive serialized from a single UI thread; output
//! events are interrupts that can land between any two intents and are
//! checked against the current binding before they touch state.

use crate::{
    error::{OutputError, PlaybackError, Result},
    events::PlayerEvent,
    favorites::FavoritesStore,
    history::PlayHistoryRecorder,
    output::{AudioOutput, OutputEvent},
    queue::QueueEngine,
    types::{
        BindingId, Direction, PlaybackPosition, PlaybackState, PlaybackStatus, PlayerConfig,
        ReturnTarget,
    },
    volume::Volume,
};
use crossbeam_channel::Receiver;
use lyra_core::{Identity, QueueSource, Track, TrackId};
use tracing::{debug, info, warn};

/// Main playback controller
///
/// States: `Idle` (nothing current), `Paused`, `Playing`. Output failures
/// drop to `Paused` and keep the queue position, so the user can retry with
/// `toggle_play` or skip.
pub struct PlaybackController {
    config: PlayerConfig,
    queue: QueueEngine,
    output: Box<dyn AudioOutput>,
    output_events: Receiver<OutputEvent>,
    favorites: FavoritesStore,
    history: PlayHistoryRecorder,
    identity: Option<Identity>,

    state: PlaybackState,
    volume: Volume,
    position: PlaybackPosition,

    /// Binding currently owning the output
    binding: Option<BindingId>,
    next_binding: u64,
    /// The current binding failed to resolve or was refused
    media_failed: bool,
    /// The output already reported the current binding's load error
    load_error_reported: bool,

    events: Vec<PlayerEvent>,
    last_status: PlaybackStatus,
    last_error: Option<PlaybackError>,
    shut_down: bool,
}

impl PlaybackController {
    /// Create a controller owning `output`
    ///
    /// The output is the engine's only audio resource; it is disposed by
    /// `shutdown` or when the controller is dropped.
    pub fn new(
        config: PlayerConfig,
        mut output: Box<dyn AudioOutput>,
        favorites: FavoritesStore,
    ) -> Self {
        let volume = Volume::new(config.initial_volume);
        output.set_volume(volume.gain());
        let output_events = output.events();

        Self {
            queue: QueueEngine::new(),
            output,
            output_events,
            favorites,
            history: PlayHistoryRecorder::disabled(),
            identity: None,
            state: PlaybackState::new(volume.level()),
            volume,
            position: PlaybackPosition::default(),
            binding: None,
            next_binding: 0,
            media_failed: false,
            load_error_reported: false,
            events: Vec::new(),
            last_status: PlaybackStatus::Idle,
            last_error: None,
            shut_down: false,
            config,
        }
    }

    /// Report plays to `history` (respects `record_history`)
    #[must_use]
    pub fn with_history(mut self, history: PlayHistoryRecorder) -> Self {
        if self.config.record_history {
            self.history = history;
        }
        self
    }

    /// Replace the (empty) queue engine, e.g. with a seeded one
    #[must_use]
    pub fn with_queue(mut self, queue: QueueEngine) -> Self {
        self.queue = queue;
        self.recompute_projected_state();
        self
    }

    // ===== Queue intents =====

    /// Replace the queue with `tracks` and start playing `tracks[start_index]`
    ///
    /// Rejects an empty list or an out-of-range index without any effect.
    pub fn play_tracks(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        source: Option<QueueSource>,
    ) -> Result<()> {
        let was_shuffled = self.queue.is_shuffled();
        let previous_track_id = self.current_track_id();

        if let Err(e) = self.queue.set_queue(tracks, start_index, source) {
            warn!(error = %e, "Rejected queue construction");
            return Err(e);
        }

        info!(
            length = self.queue.len(),
            start_index,
            source = ?self.queue.source(),
            "Queue replaced"
        );
        self.queue_replaced(was_shuffled);
        self.bind_current(previous_track_id);
        Ok(())
    }

    /// Play a single track as a one-item queue
    pub fn play_track(&mut self, track: Track, source: Option<QueueSource>) {
        let was_shuffled = self.queue.is_shuffled();
        let previous_track_id = self.current_track_id();

        self.queue.set_single(track, source);
        info!(source = ?self.queue.source(), "Queue replaced with single track");
        self.queue_replaced(was_shuffled);
        self.bind_current(previous_track_id);
    }

    /// Install a queue without selecting or playing anything
    ///
    /// `toggle_play` then starts at the first item.
    pub fn prepare_queue(&mut self, tracks: Vec<Track>, source: Option<QueueSource>) -> Result<()> {
        let was_shuffled = self.queue.is_shuffled();
        self.queue.stage(tracks, source)?;

        self.output.pause();
        self.binding = None;
        self.media_failed = false;
        self.load_error_reported = false;
        self.state.is_playing = false;
        self.position = PlaybackPosition::default();

        info!(length = self.queue.len(), "Queue staged");
        self.queue_replaced(was_shuffled);
        self.recompute_projected_state();
        Ok(())
    }

    fn queue_replaced(&mut self, was_shuffled: bool) {
        self.events.push(PlayerEvent::QueueChanged {
            length: self.queue.len(),
            source: self.queue.source().cloned(),
        });
        if was_shuffled {
            self.events
                .push(PlayerEvent::ShuffleChanged { enabled: false });
        }
    }

    // ===== Transport =====

    /// Play/pause
    ///
    /// With a staged queue and nothing current, starts at the first item.
    /// Resuming a track whose media failed reloads it first.
    pub fn toggle_play(&mut self) {
        if self.state.current_track.is_none() {
            if self.queue.select(0).is_some() {
                self.bind_current(None);
            }
            return;
        }

        if self.state.is_playing {
            self.output.pause();
            self.state.is_playing = false;
            self.emit_status();
        } else if self.media_failed {
            info!(track_id = ?self.current_track_id(), "Retrying failed track");
            let current = self.current_track_id();
            self.bind_current(current);
        } else {
            self.start_output(false);
        }
    }

    /// Skip to the next track (random one with shuffle on)
    pub fn next(&mut self) -> Option<Track> {
        self.step(Direction::Next)
    }

    /// Go back, or restart the current track when past the restart threshold
    pub fn previous(&mut self) -> Option<Track> {
        if self.queue.is_empty() {
            return None;
        }

        if self.state.current_track.is_some()
            && self.output.position().current_time > self.config.restart_threshold_secs
        {
            debug!("Restarting current track instead of going back");
            self.seek(0.0);
            return self.state.current_track.clone();
        }

        self.step(Direction::Previous)
    }

    /// End-of-track handling: the queue wraps, so this is always `next`
    pub fn on_audio_ended(&mut self) -> Option<Track> {
        self.next()
    }

    fn step(&mut self, direction: Direction) -> Option<Track> {
        let previous_track_id = self.current_track_id();
        let track = self.queue.advance(direction)?.clone();
        self.bind_current(previous_track_id);
        Some(track)
    }

    /// Flip shuffle; playback is unaffected
    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = self.queue.toggle_shuffle();
        debug!(enabled, "Shuffle toggled");
        self.events.push(PlayerEvent::ShuffleChanged { enabled });
        enabled
    }

    /// Seek within the current track, returns the clamped position
    pub fn seek(&mut self, seconds: f64) -> f64 {
        let position = self.output.seek(seconds);
        self.position.current_time = position;
        self.push_position();
        position
    }

    // ===== Volume =====

    /// Set volume, clamped to [0, 1]; returns the applied level
    pub fn set_volume(&mut self, level: f32) -> f32 {
        let level = self.volume.set_level(level);
        self.apply_volume();
        level
    }

    /// Mute or restore the previous level, returns whether muted
    ///
    /// Unmuting from a zero level restores the configured initial volume.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.volume.toggle_mute(self.config.initial_volume);
        self.apply_volume();
        muted
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    fn apply_volume(&mut self) {
        self.output.set_volume(self.volume.gain());
        self.state.volume = self.volume.level();
        self.events.push(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    // ===== Favorites =====

    /// Like or unlike `track`, or the current track when `None`
    ///
    /// The optimistic change is visible in `state().liked` before the
    /// remote call; `liked` only ever reflects the current track.
    pub async fn toggle_like(&mut self, track: Option<&Track>) -> Result<bool> {
        let identity = self.identity.clone().ok_or(PlaybackError::NotSignedIn)?;
        let target = match track {
            Some(track) => track.clone(),
            None => self
                .state
                .current_track
                .clone()
                .ok_or(PlaybackError::NoTrackLoaded)?,
        };

        let pending = self.favorites.begin_toggle(&identity, &target)?;
        self.recompute_projected_state();

        let outcome = pending.settle().await;
        self.recompute_projected_state();

        outcome.map_err(|e| {
            let err = PlaybackError::from(e);
            self.report(err.clone());
            err
        })
    }

    /// Sign in (`Some`) or out (`None`)
    ///
    /// Signing in reloads favorites; a failed load keeps the previous set
    /// and is reported as a non-fatal error. Signing out clears them.
    pub async fn set_identity(&mut self, identity: Option<Identity>) {
        match identity {
            Some(identity) => {
                info!(user = %identity.id, "Identity changed");
                self.identity = Some(identity.clone());
                if let Err(e) = self.favorites.load_for(&identity).await {
                    self.report(PlaybackError::Favorites(e));
                }
            }
            None => {
                info!("Signed out");
                self.identity = None;
                self.favorites.clear();
            }
        }
        self.recompute_projected_state();
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    // ===== Output events =====

    /// Handle every queued output event, returns how many were handled
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.output_events.try_recv() {
            self.handle_output_event(event);
            handled += 1;
        }
        handled
    }

    /// Handle one output event
    ///
    /// Events from a binding that is no longer current are ignored.
    pub fn handle_output_event(&mut self, event: OutputEvent) {
        if Some(event.binding()) != self.binding {
            debug!(binding = event.binding().0, "Ignoring event from stale binding");
            return;
        }

        match event {
            OutputEvent::Progress { current_time, .. } => {
                self.position.current_time = current_time;
                self.push_position();
            }
            OutputEvent::DurationKnown { duration, .. } => {
                self.position.duration = duration;
                self.push_position();
            }
            OutputEvent::Ended { .. } => {
                debug!(track_id = ?self.current_track_id(), "Track ended");
                self.on_audio_ended();
            }
            OutputEvent::Error { message, .. } => {
                if self.load_error_reported {
                    debug!(%message, "Media failure already reported");
                    return;
                }
                self.media_failed = true;
                self.load_error_reported = true;
                self.output.pause();
                self.state.is_playing = false;
                self.report(PlaybackError::Media(message));
                self.emit_status();
            }
        }
    }

    // ===== Binding =====

    fn bind_current(&mut self, previous_track_id: Option<TrackId>) {
        let Some(track) = self.queue.current().cloned() else {
            return;
        };

        self.next_binding += 1;
        let binding = BindingId(self.next_binding);
        self.binding = Some(binding);
        self.media_failed = false;
        self.load_error_reported = false;
        self.position = PlaybackPosition {
            current_time: 0.0,
            duration: track.duration_seconds,
        };

        self.output.load(binding, &track);
        self.output.set_volume(self.volume.gain());
        debug!(track_id = %track.id, binding = binding.0, "Track bound");

        self.events.push(PlayerEvent::TrackChanged {
            track_id: track.id.clone(),
            previous_track_id,
        });
        self.record_play(&track.id);
        self.recompute_projected_state();
        self.start_output(true);
    }

    /// Start the bound media
    ///
    /// Right after a load, `NotLoaded` means the load itself failed; the
    /// output's `Error` event carries the cause and is reported instead.
    fn start_output(&mut self, fresh_binding: bool) {
        self.state.is_playing = true;
        match self.output.play() {
            Ok(()) => {}
            Err(OutputError::NotLoaded) if fresh_binding => {
                self.state.is_playing = false;
                self.media_failed = true;
                debug!(track_id = ?self.current_track_id(), "Load failed, waiting for output error");
            }
            Err(e) => {
                self.state.is_playing = false;
                self.media_failed = true;
                self.report(PlaybackError::from(e));
            }
        }
        self.emit_status();
    }

    fn record_play(&self, track_id: &TrackId) {
        if let Some(identity) = &self.identity {
            self.history.record(identity, track_id);
        }
    }

    // ===== Projection =====

    /// Refresh `current_track` and `liked` from the queue and favorites
    ///
    /// Called after every queue or favorites mutation the controller makes;
    /// call it after changing favorites through another store handle.
    pub fn recompute_projected_state(&mut self) {
        let current = self.queue.current().cloned();
        let liked = current
            .as_ref()
            .is_some_and(|track| self.favorites.is_liked(&track.id));

        if liked != self.state.liked {
            if let Some(track) = &current {
                self.events.push(PlayerEvent::LikeChanged {
                    track_id: track.id.clone(),
                    liked,
                });
            }
            self.state.liked = liked;
        }
        self.state.current_track = current;
        self.emit_status();
    }

    fn emit_status(&mut self) {
        let status = self.state.status();
        if status != self.last_status {
            self.last_status = status;
            self.events.push(PlayerEvent::StateChanged { status });
        }
    }

    fn push_position(&mut self) {
        self.events.push(PlayerEvent::PositionUpdate {
            current_time: self.position.current_time,
            duration: self.position.duration,
        });
    }

    fn report(&mut self, error: PlaybackError) {
        warn!(error = %error, "Playback error");
        self.events.push(PlayerEvent::Error {
            message: error.to_string(),
        });
        self.last_error = Some(error);
    }

    fn current_track_id(&self) -> Option<TrackId> {
        self.state.current_track.as_ref().map(|track| track.id.clone())
    }

    // ===== State =====

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    /// Position mirrored from the output's events
    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    pub fn queue(&self) -> &QueueEngine {
        &self.queue
    }

    pub fn is_shuffled(&self) -> bool {
        self.queue.is_shuffled()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Where "go to track source" should lead, `None` when nothing is current
    pub fn return_target(&self) -> Option<ReturnTarget> {
        self.state.current_track.as_ref()?;
        Some(match self.queue.source() {
            Some(source) => ReturnTarget::Source(source.clone()),
            None => ReturnTarget::Fallback(self.config.fallback_return_target.clone()),
        })
    }

    /// Most recent non-fatal error
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    /// Take all buffered events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    // ===== Lifecycle =====

    /// Stop playback and release the audio output; idempotent
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.output.pause();
        self.output.dispose();
        self.binding = None;
        self.state.is_playing = false;
        self.emit_status();
        info!("Playback controller shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
