//! Liked-track cache for the signed-in identity
//!
//! The local set is read on every track render and written rarely, so
//! writes are optimistic: `begin_toggle` flips local membership at once and
//! returns a [`PendingToggle`] whose `settle` performs the remote call.
//!
//! Concurrent toggles of the same track go through a per-track lane:
//!
//! ```text
//! begin A (add)    local = liked     lane = [A]
//! begin B (remove) local = unliked   lane = [A, B]
//! settle A  -> remote add            lane = [B]      local untouched
//! settle B  -> remote remove         lane = []       local = confirmed
//! ```
//!
//! Remote calls in a lane are issued strictly in intent order, whatever
//! order the futures are polled in. `confirmed` tracks the last remote
//! truth; when the lane drains, local membership is set to it. A failed
//! last intent therefore rolls back to what the remote store actually
//! holds, and a successful one leaves the latest intent in place.
//!
//! Identity changes (`load_for` for another user, `clear`) bump an epoch.
//! Work from an older epoch never touches the new identity's set. Reloading
//! for the same identity keeps the lanes: their latest intents, and writes
//! that landed while the list call was in flight, are laid over the loaded
//! snapshot.

use crate::error::FavoritesError;
use lyra_core::{FavoritesService, Identity, Track, TrackId, UserId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

/// Result type for favorites operations
pub type Result<T> = std::result::Result<T, FavoritesError>;

/// In-flight intents for one track
struct Lane {
    /// Generations waiting for or performing their remote call, oldest
    /// first, with the membership each one asks for
    pending: VecDeque<(u64, bool)>,

    /// Membership the remote store holds as far as we know
    confirmed: bool,

    notify: Arc<Notify>,
}

struct FavoritesState {
    owner: Option<UserId>,
    liked: HashSet<TrackId>,
    /// Bumped whenever the set is replaced for an identity change
    epoch: u64,
    /// Bumped by every load and clear, only the latest load may apply
    load_seq: u64,
    next_generation: u64,
    lanes: HashMap<TrackId, Lane>,
    /// Bumped by every successful remote write
    write_seq: u64,
    /// Last successful write per track since the last applied load
    recent_writes: HashMap<TrackId, (u64, bool)>,
}

impl FavoritesState {
    /// Replace the set, returning the wakers of abandoned lanes
    fn reset(&mut self, owner: Option<UserId>, liked: HashSet<TrackId>) -> Vec<Arc<Notify>> {
        self.epoch += 1;
        self.owner = owner;
        self.liked = liked;
        self.recent_writes.clear();
        self.lanes.drain().map(|(_, lane)| lane.notify).collect()
    }

    /// Replace the set with a fresh snapshot for the same owner
    ///
    /// Writes newer than `since` and the latest intent of every open lane
    /// win over the snapshot.
    fn refresh(&mut self, mut liked: HashSet<TrackId>, since: u64) {
        for (track_id, (seq, member)) in self.recent_writes.drain() {
            if seq > since {
                set_membership(&mut liked, track_id, member);
            }
        }
        for (track_id, lane) in &self.lanes {
            if let Some(&(_, desired)) = lane.pending.back() {
                set_membership(&mut liked, track_id.clone(), desired);
            }
        }
        self.liked = liked;
    }
}

fn set_membership(liked: &mut HashSet<TrackId>, track_id: TrackId, member: bool) -> bool {
    if member {
        liked.insert(track_id)
    } else {
        liked.remove(&track_id)
    }
}

enum Turn {
    Ready,
    Wait(Arc<Notify>),
}

struct Inner {
    service: Arc<dyn FavoritesService>,
    state: Mutex<FavoritesState>,
    revision: watch::Sender<u64>,
}

/// Process-wide favorites cache
///
/// Cheap to clone; clones share the same set.
#[derive(Clone)]
pub struct FavoritesStore {
    inner: Arc<Inner>,
}

impl FavoritesStore {
    pub fn new(service: Arc<dyn FavoritesService>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                service,
                state: Mutex::new(FavoritesState {
                    owner: None,
                    liked: HashSet::new(),
                    epoch: 0,
                    load_seq: 0,
                    next_generation: 0,
                    lanes: HashMap::new(),
                    write_seq: 0,
                    recent_writes: HashMap::new(),
                }),
                revision,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FavoritesState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_revision(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }

    fn wake(notifies: Vec<Arc<Notify>>) {
        for notify in notifies {
            notify.notify_waiters();
        }
    }

    /// Replace the set with the remote truth for `identity`
    ///
    /// On failure the previous set is kept and the error returned. A load
    /// overtaken by a later load or a `clear` is discarded. Reloading for the
    /// current owner keeps in-flight toggles alive.
    pub async fn load_for(&self, identity: &Identity) -> Result<usize> {
        let (ticket, writes_before) = {
            let mut state = self.lock();
            state.load_seq += 1;
            (state.load_seq, state.write_seq)
        };

        let liked = match self.inner.service.list(identity).await {
            Ok(liked) => liked,
            Err(e) => {
                warn!(user = %identity.id, error = %e, "Failed to load favorites, keeping previous set");
                return Err(e.into());
            }
        };

        let (abandoned, count) = {
            let mut state = self.lock();
            if state.load_seq != ticket {
                debug!(user = %identity.id, "Discarding superseded favorites load");
                return Err(FavoritesError::IdentityChanged);
            }
            let abandoned = if state.owner.as_ref() == Some(&identity.id) {
                state.refresh(liked, writes_before);
                Vec::new()
            } else {
                state.reset(Some(identity.id.clone()), liked)
            };
            (abandoned, state.liked.len())
        };
        Self::wake(abandoned);
        self.bump_revision();

        info!(user = %identity.id, count, "Favorites loaded");
        Ok(count)
    }

    /// Wipe the local set (sign-out), no remote call
    pub fn clear(&self) {
        let abandoned = {
            let mut state = self.lock();
            state.load_seq += 1;
            state.reset(None, HashSet::new())
        };
        Self::wake(abandoned);
        self.bump_revision();
        info!("Favorites cleared");
    }

    /// Local lookup, no I/O
    pub fn is_liked(&self, track_id: &TrackId) -> bool {
        self.lock().liked.contains(track_id)
    }

    pub fn len(&self) -> usize {
        self.lock().liked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().liked.is_empty()
    }

    /// Copy of the local set
    pub fn snapshot(&self) -> HashSet<TrackId> {
        self.lock().liked.clone()
    }

    /// Identity the set currently belongs to
    pub fn owner(&self) -> Option<UserId> {
        self.lock().owner.clone()
    }

    /// Whether remote calls for `track_id` are still outstanding
    pub fn has_pending(&self, track_id: &TrackId) -> bool {
        self.lock().lanes.contains_key(track_id)
    }

    /// Counter bumped on every local change
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Watch local changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Toggle membership of `track` and wait for the remote store
    ///
    /// Returns the new membership, or the remote error after rollback.
    pub async fn toggle(&self, identity: &Identity, track: &Track) -> Result<bool> {
        self.begin_toggle(identity, track)?.settle().await
    }

    /// Flip local membership of `track` now, remote call deferred
    ///
    /// The local set is updated before this returns, so readers never see a
    /// stale value while the remote call is in flight.
    pub fn begin_toggle(&self, identity: &Identity, track: &Track) -> Result<PendingToggle> {
        let (desired, generation, epoch) = {
            let mut state = self.lock();
            match &state.owner {
                Some(owner) if owner != &identity.id => {
                    return Err(FavoritesError::IdentityMismatch {
                        loaded: owner.to_string(),
                        requested: identity.id.to_string(),
                    });
                }
                Some(_) => {}
                None => state.owner = Some(identity.id.clone()),
            }

            let was_liked = state.liked.contains(&track.id);
            let desired = !was_liked;
            set_membership(&mut state.liked, track.id.clone(), desired);

            state.next_generation += 1;
            let generation = state.next_generation;
            state
                .lanes
                .entry(track.id.clone())
                .or_insert_with(|| Lane {
                    pending: VecDeque::new(),
                    confirmed: was_liked,
                    notify: Arc::new(Notify::new()),
                })
                .pending
                .push_back((generation, desired));

            (desired, generation, state.epoch)
        };
        self.bump_revision();

        debug!(track_id = %track.id, liked = desired, generation, "Optimistic favorites update");
        Ok(PendingToggle {
            store: self.clone(),
            identity: identity.clone(),
            track_id: track.id.clone(),
            desired,
            generation,
            epoch,
            settled: false,
        })
    }

    fn turn(&self, track_id: &TrackId, generation: u64, epoch: u64) -> Result<Turn> {
        let state = self.lock();
        if state.epoch != epoch {
            return Err(FavoritesError::IdentityChanged);
        }
        let lane = state
            .lanes
            .get(track_id)
            .ok_or(FavoritesError::IdentityChanged)?;
        if lane.pending.front().map(|&(front, _)| front) == Some(generation) {
            Ok(Turn::Ready)
        } else {
            Ok(Turn::Wait(Arc::clone(&lane.notify)))
        }
    }

    /// Retire `generation` from its lane and reconcile when the lane drains
    fn finish(&self, track_id: &TrackId, generation: u64, epoch: u64, applied: Option<bool>) {
        let (notify, changed) = {
            let mut state = self.lock();
            if state.epoch != epoch {
                return;
            }
            let Some(lane) = state.lanes.get_mut(track_id) else {
                return;
            };

            lane.pending.retain(|&(pending, _)| pending != generation);
            if let Some(membership) = applied {
                lane.confirmed = membership;
            }
            let notify = Arc::clone(&lane.notify);
            let drained = lane.pending.is_empty();
            let confirmed = lane.confirmed;

            if let Some(membership) = applied {
                state.write_seq += 1;
                let seq = state.write_seq;
                state
                    .recent_writes
                    .insert(track_id.clone(), (seq, membership));
            }

            let mut changed = false;
            if drained {
                state.lanes.remove(track_id);
                changed = set_membership(&mut state.liked, track_id.clone(), confirmed);
                if changed {
                    warn!(track_id = %track_id, liked = confirmed, "Favorites rolled back to remote state");
                }
            }
            (notify, changed)
        };

        notify.notify_waiters();
        if changed {
            self.bump_revision();
        }
    }
}

impl fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("FavoritesStore")
            .field("owner", &state.owner)
            .field("liked", &state.liked.len())
            .field("pending_tracks", &state.lanes.len())
            .finish()
    }
}

/// An optimistic favorites change awaiting its remote call
///
/// Dropping it without settling withdraws the intent: if it was the last
/// one for its track, local membership returns to the remote state.
#[must_use = "the remote call only happens when the toggle is settled"]
pub struct PendingToggle {
    store: FavoritesStore,
    identity: Identity,
    track_id: TrackId,
    desired: bool,
    generation: u64,
    epoch: u64,
    settled: bool,
}

impl PendingToggle {
    pub fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    /// Membership this toggle asks for
    pub fn desired(&self) -> bool {
        self.desired
    }

    /// Perform the remote call once every earlier intent for the track is done
    pub async fn settle(mut self) -> Result<bool> {
        self.wait_turn().await?;

        let service = Arc::clone(&self.store.inner.service);
        let outcome = if self.desired {
            service.add(&self.identity, &self.track_id).await
        } else {
            service.remove(&self.identity, &self.track_id).await
        };

        self.settled = true;
        let applied = outcome.is_ok().then_some(self.desired);
        self.store
            .finish(&self.track_id, self.generation, self.epoch, applied);

        match outcome {
            Ok(()) => Ok(self.desired),
            Err(e) => {
                warn!(track_id = %self.track_id, error = %e, "Favorites update failed");
                Err(FavoritesError::Remote(e))
            }
        }
    }

    async fn wait_turn(&self) -> Result<()> {
        loop {
            let notify = match self
                .store
                .turn(&self.track_id, self.generation, self.epoch)?
            {
                Turn::Ready => return Ok(()),
                Turn::Wait(notify) => notify,
            };

            // Register before re-checking so a wake between the two is not lost
            let mut notified = std::pin::pin!(notify.notified());
            notified.as_mut().enable();
            if let Turn::Ready = self
                .store
                .turn(&self.track_id, self.generation, self.epoch)?
            {
                return Ok(());
            }
            notified.await;
        }
    }
}

impl Drop for PendingToggle {
    fn drop(&mut self) {
        if !self.settled {
            debug!(track_id = %self.track_id, generation = self.generation, "Favorites intent withdrawn");
            self.store
                .finish(&self.track_id, self.generation, self.epoch, None);
        }
    }
}

impl fmt::Debug for PendingToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingToggle")
            .field("track_id", &self.track_id)
            .field("desired", &self.desired)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
