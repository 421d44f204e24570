//! Remote collaborator contracts consumed by the playback engine

use crate::error::Result;
use crate::types::{Identity, TrackId};
use async_trait::async_trait;
use std::collections::HashSet;

/// Favorites persistence service
///
/// Each call is a fallible remote round trip. `add` and `remove` are absolute
/// (not toggles), so replaying the latest intent is always safe.
#[async_trait]
pub trait FavoritesService: Send + Sync {
    /// List every liked track of `identity`
    async fn list(&self, identity: &Identity) -> Result<HashSet<TrackId>>;

    /// Mark `track_id` as liked by `identity`
    async fn add(&self, identity: &Identity, track_id: &TrackId) -> Result<()>;

    /// Remove `track_id` from the likes of `identity`
    async fn remove(&self, identity: &Identity, track_id: &TrackId) -> Result<()>;
}

/// Play-history service
///
/// Fire-and-forget from the engine's point of view: failures are logged and
/// never reach the user.
#[async_trait]
pub trait PlayHistoryService: Send + Sync {
    /// Record that `identity` started playing `track_id`
    async fn record(&self, identity: &Identity, track_id: &TrackId) -> Result<()>;
}
