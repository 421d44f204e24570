//! Fire-and-forget play-history recording
//!
//! Plays are reported to the remote history service on the ambient tokio
//! runtime. Failures are logged and swallowed; they never block or fail
//! playback.

use lyra_core::{Identity, PlayHistoryService, TrackId};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Play-history recorder
#[derive(Clone)]
pub struct PlayHistoryRecorder {
    service: Option<Arc<dyn PlayHistoryService>>,
}

impl PlayHistoryRecorder {
    pub fn new(service: Arc<dyn PlayHistoryService>) -> Self {
        Self {
            service: Some(service),
        }
    }

    /// Recorder that drops every play
    pub fn disabled() -> Self {
        Self { service: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    /// Record a play in the background
    ///
    /// Returns the spawned task, or `None` when recording is disabled or no
    /// tokio runtime is running on this thread.
    pub fn record(&self, identity: &Identity, track_id: &TrackId) -> Option<JoinHandle<()>> {
        let service = Arc::clone(self.service.as_ref()?);

        let Ok(runtime) = Handle::try_current() else {
            debug!(track_id = %track_id, "No async runtime, play history not recorded");
            return None;
        };

        let identity = identity.clone();
        let track_id = track_id.clone();
        Some(runtime.spawn(async move {
            match service.record(&identity, &track_id).await {
                Ok(()) => debug!(user = %identity.id, track_id = %track_id, "Play recorded"),
                Err(e) => warn!(
                    user = %identity.id,
                    track_id = %track_id,
                    error = %e,
                    "Failed to record play history"
                ),
            }
        }))
    }
}

impl fmt::Debug for PlayHistoryRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayHistoryRecorder")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::InMemoryPlayHistory;

    #[test]
    fn without_runtime_nothing_is_spawned() {
        let history = Arc::new(InMemoryPlayHistory::new());
        let recorder = PlayHistoryRecorder::new(history.clone());

        let handle = recorder.record(&Identity::new("alice", "Alice"), &TrackId::new("a"));
        assert!(handle.is_none());
        assert!(history.entries().is_empty());
    }

    #[tokio::test]
    async fn disabled_recorder_spawns_nothing() {
        let recorder = PlayHistoryRecorder::disabled();
        assert!(!recorder.is_enabled());
        assert!(recorder
            .record(&Identity::new("alice", "Alice"), &TrackId::new("a"))
            .is_none());
    }

    #[tokio::test]
    async fn records_in_background() {
        let history = Arc::new(InMemoryPlayHistory::new());
        let recorder = PlayHistoryRecorder::new(history.clone());

        recorder
            .record(&Identity::new("alice", "Alice"), &TrackId::new("a"))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(history.entries().len(), 1);
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let history = Arc::new(InMemoryPlayHistory::new());
        history.set_offline(true);
        let recorder = PlayHistoryRecorder::new(history.clone());

        let task = recorder
            .record(&Identity::new("alice", "Alice"), &TrackId::new("a"))
            .unwrap();
        assert!(task.await.is_ok());
        assert!(history.entries().is_empty());
    }
}
