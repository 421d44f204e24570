//! In-memory collaborator implementations
//!
//! Used by the shell driver and by tests. Both services can be switched
//! offline to exercise the engine's failure paths.

use crate::error::{Result, ServiceError};
use crate::traits::{FavoritesService, PlayHistoryService};
use crate::types::{Identity, TrackId, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Favorites table kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryFavorites {
    rows: Mutex<HashMap<UserId, HashSet<TrackId>>>,
    offline: AtomicBool,
}

impl InMemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table with likes for `user`
    pub fn seed(&self, user: &UserId, tracks: impl IntoIterator<Item = TrackId>) {
        lock(&self.rows)
            .entry(user.clone())
            .or_default()
            .extend(tracks);
    }

    /// Make every following call fail with a network error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Remote truth for `user`
    pub fn liked(&self, user: &UserId) -> HashSet<TrackId> {
        lock(&self.rows).get(user).cloned().unwrap_or_default()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ServiceError::network("favorites store unreachable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FavoritesService for InMemoryFavorites {
    async fn list(&self, identity: &Identity) -> Result<HashSet<TrackId>> {
        self.check_online()?;
        Ok(self.liked(&identity.id))
    }

    async fn add(&self, identity: &Identity, track_id: &TrackId) -> Result<()> {
        self.check_online()?;
        lock(&self.rows)
            .entry(identity.id.clone())
            .or_default()
            .insert(track_id.clone());
        Ok(())
    }

    async fn remove(&self, identity: &Identity, track_id: &TrackId) -> Result<()> {
        self.check_online()?;
        if let Some(liked) = lock(&self.rows).get_mut(&identity.id) {
            liked.remove(track_id);
        }
        Ok(())
    }
}

/// Play-history table kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryPlayHistory {
    entries: Mutex<Vec<(UserId, TrackId)>>,
    offline: AtomicBool,
}

impl InMemoryPlayHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every recorded play, oldest first
    pub fn entries(&self) -> Vec<(UserId, TrackId)> {
        lock(&self.entries).clone()
    }

    /// Most recent distinct tracks played by `user`, newest first
    pub fn recently_played(&self, user: &UserId, limit: usize) -> Vec<TrackId> {
        let mut seen = HashSet::new();
        lock(&self.entries)
            .iter()
            .rev()
            .filter(|(owner, _)| owner == user)
            .filter(|(_, track)| seen.insert(track.clone()))
            .take(limit)
            .map(|(_, track)| track.clone())
            .collect()
    }
}

#[async_trait]
impl PlayHistoryService for InMemoryPlayHistory {
    async fn record(&self, identity: &Identity, track_id: &TrackId) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ServiceError::network("play history unreachable"));
        }
        lock(&self.entries).push((identity.id.clone(), track_id.clone()));
        Ok(())
    }
}
