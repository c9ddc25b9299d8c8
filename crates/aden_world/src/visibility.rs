//! Per-observer LOD caches and the reverse visibility index.
//!
//! A periodic batch pass rebuilds every observer's near/medium/far sets
//! from the region grid, then publishes the new caches and the reverse
//! index `observed id → observer ids` at a single point. Broadcasting an
//! event from a source is then O(|observers of source|) instead of
//! O(|players|²), at the price of up to one refresh period of staleness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use crate::object::ObjectId;
use crate::player::Player;
use crate::region::{LodBucket, LodLevel};
use crate::world::World;

/// One observer's three buckets. An object appears in at most one bucket.
#[derive(Default, Clone)]
pub struct ObserverView {
    near: FxHashSet<ObjectId>,
    medium: FxHashSet<ObjectId>,
    far: FxHashSet<ObjectId>,
    /// Batch number this view was last rebuilt in; 0 before the first
    /// refresh after registration.
    pub last_refresh: u64,
}

impl ObserverView {
    pub fn bucket_of(&self, id: ObjectId) -> Option<LodBucket> {
        if self.near.contains(&id) {
            Some(LodBucket::Near)
        } else if self.medium.contains(&id) {
            Some(LodBucket::Medium)
        } else if self.far.contains(&id) {
            Some(LodBucket::Far)
        } else {
            None
        }
    }

    fn bucket_mut(&mut self, bucket: LodBucket) -> &mut FxHashSet<ObjectId> {
        match bucket {
            LodBucket::Near => &mut self.near,
            LodBucket::Medium => &mut self.medium,
            LodBucket::Far => &mut self.far,
        }
    }

    fn observed(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.near
            .iter()
            .chain(&self.medium)
            .chain(&self.far)
            .copied()
    }
}

type ReverseIndex = FxHashMap<ObjectId, Vec<ObjectId>>;

pub struct VisibilityManager {
    world: Arc<World>,
    refresh_period: Duration,
    observers: RwLock<FxHashMap<ObjectId, ObserverView>>,
    /// Swapped wholesale on publish; broadcast paths clone the `Arc` and
    /// read a consistent snapshot without holding any lock.
    reverse: RwLock<Arc<ReverseIndex>>,
    batch: AtomicU64,
}

impl VisibilityManager {
    pub fn new(world: Arc<World>, refresh_period: Duration) -> Self {
        Self {
            world,
            refresh_period,
            observers: RwLock::new(FxHashMap::default()),
            reverse: RwLock::new(Arc::new(ReverseIndex::default())),
            batch: AtomicU64::new(0),
        }
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_period
    }

    /// Adds a player as an observer. Its observed side comes for free by
    /// being present in the world grid.
    pub fn register_player(&self, player: &Arc<Player>) {
        self.observers
            .write()
            .insert(player.id, ObserverView::default());
    }

    /// Removes the player from both sides of the index. Other observers'
    /// buckets may keep the stale id until the next batch; lookups through
    /// the reverse index no longer return it.
    pub fn unregister_player(&self, id: ObjectId) {
        let mut observers = self.observers.write();

        if observers.remove(&id).is_none() {
            return;
        }

        let mut reverse = self.reverse.write();
        let mut next: ReverseIndex = ReverseIndex::default();

        for (&observed, watchers) in reverse.iter() {
            if observed == id {
                continue;
            }

            let filtered: Vec<ObjectId> = watchers.iter().copied().filter(|&o| o != id).collect();

            if !filtered.is_empty() {
                next.insert(observed, filtered);
            }
        }

        *reverse = Arc::new(next);
    }

    pub fn is_registered(&self, id: ObjectId) -> bool {
        self.observers.read().contains_key(&id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// The bucket `object` currently sits in for `observer`.
    pub fn bucket_of(&self, observer: ObjectId, object: ObjectId) -> Option<LodBucket> {
        self.observers.read().get(&observer)?.bucket_of(object)
    }

    /// Whether `observer` sees `object` at `lod`, per the current caches.
    pub fn sees_at(&self, observer: ObjectId, object: ObjectId, lod: LodLevel) -> bool {
        self.bucket_of(observer, object)
            .is_some_and(|bucket| lod.includes(bucket))
    }

    /// Whether `object` is anywhere in `observer`'s caches.
    pub fn sees(&self, observer: ObjectId, object: ObjectId) -> bool {
        self.bucket_of(observer, object).is_some()
    }

    /// Observer ids of `source`, from the last published batch.
    pub fn observers_of(&self, source: ObjectId) -> Vec<ObjectId> {
        self.reverse
            .read()
            .get(&source)
            .cloned()
            .unwrap_or_default()
    }

    /// The reverse index of the last published batch.
    pub fn reverse_snapshot(&self) -> Arc<ReverseIndex> {
        self.reverse.read().clone()
    }

    /// Number of completed batches.
    pub fn batch_count(&self) -> u64 {
        self.batch.load(Ordering::Acquire)
    }

    /// Runs one batch pass: recompute every observer's buckets from the
    /// region grid, rebuild the reverse index, publish both. Returns the
    /// batch number.
    pub fn refresh_once(&self) -> u64 {
        let observer_ids: Vec<ObjectId> = self.observers.read().keys().copied().collect();

        let mut views: FxHashMap<ObjectId, ObserverView> = FxHashMap::default();
        views.reserve(observer_ids.len());

        for id in observer_ids {
            // The player may have logged out since the snapshot; its view
            // is dropped at publish time in that case.
            let Some(player) = self.world.get_player(id) else {
                continue;
            };

            let center = player.location().region();
            let mut view = ObserverView::default();

            for &(dx, dy) in LodLevel::All.offsets() {
                let cell = center.offset(dx, dy);

                let Some(bucket) = center.bucket_of(cell) else {
                    continue;
                };

                for observed in self.world.snapshot_region(cell) {
                    if observed != id {
                        view.bucket_mut(bucket).insert(observed);
                    }
                }
            }

            views.insert(id, view);
        }

        let mut reverse = ReverseIndex::default();

        for (&observer, view) in &views {
            for observed in view.observed() {
                reverse.entry(observed).or_default().push(observer);
            }
        }

        // Single publish point: caches and the reverse index swap while
        // the observer table is write-locked.
        let batch = self.batch.fetch_add(1, Ordering::AcqRel) + 1;
        let mut observers = self.observers.write();

        for (id, mut view) in views {
            // Skip observers unregistered while the pass ran.
            if observers.contains_key(&id) {
                view.last_refresh = batch;
                observers.insert(id, view);
            }
        }

        *self.reverse.write() = Arc::new(reverse);
        drop(observers);

        trace!(batch, "visibility batch published");
        batch
    }

    /// Periodic refresh driver; stops when the shutdown flag flips.
    pub fn spawn_refresh_task(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let mgr = self.clone();

        tokio::spawn(async move {
            let mut ticker = time::interval(mgr.refresh_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        mgr.refresh_once();
                    }
                    res = shutdown.changed() => {
                        if res.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("visibility refresh task stopped");
        })
    }

    /// Drops every cache. Part of server teardown.
    pub fn clear(&self) {
        self.observers.write().clear();
        *self.reverse.write() = Arc::new(ReverseIndex::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::WorldObject;
    use crate::player::PlayerStats;
    use crate::region::Location;

    fn spawn(world: &World, vis: &VisibilityManager, id: u32, x: i32, y: i32) -> Arc<Player> {
        let player = Arc::new(Player::new(
            ObjectId(id),
            id as i32,
            "acct",
            format!("p{id}"),
            PlayerStats::default(),
            Location::new(x, y, 0),
        ));

        world
            .add_object(WorldObject::Player(player.clone()))
            .unwrap();
        vis.register_player(&player);

        player
    }

    fn setup() -> (Arc<World>, VisibilityManager) {
        let world = Arc::new(World::new());
        let vis = VisibilityManager::new(world.clone(), Duration::from_millis(100));
        (world, vis)
    }

    const CELL: i32 = 1 << 12;

    #[test]
    fn buckets_and_reverse_index_agree() {
        let (world, vis) = setup();

        let a = spawn(&world, &vis, (1 << 28) + 1, 0, 0);
        let b = spawn(&world, &vis, (1 << 28) + 2, 50, 50);
        let c = spawn(&world, &vis, (1 << 28) + 3, CELL, 0);
        let d = spawn(&world, &vis, (1 << 28) + 4, CELL, CELL);

        vis.refresh_once();

        let reverse = vis.reverse_snapshot();

        for observer in [a.id, b.id, c.id, d.id] {
            for observed in [a.id, b.id, c.id, d.id] {
                let in_bucket = vis.bucket_of(observer, observed).is_some();
                let in_reverse = reverse
                    .get(&observed)
                    .is_some_and(|list| list.contains(&observer));

                assert_eq!(
                    in_bucket, in_reverse,
                    "bucket/reverse disagree for {observer:?} -> {observed:?}"
                );
            }
        }
    }

    #[test]
    fn lod_delivery_sets_match_the_layout() {
        let (world, vis) = setup();

        // A and B share a cell; C sits in the edge-adjacent cell.
        let a = spawn(&world, &vis, (1 << 28) + 1, 0, 0);
        let b = spawn(&world, &vis, (1 << 28) + 2, 80, 80);
        let c = spawn(&world, &vis, (1 << 28) + 3, CELL, 0);

        vis.refresh_once();

        let mut watchers = vis.observers_of(a.id);
        watchers.sort_unstable();
        assert_eq!(watchers, vec![b.id, c.id]);

        assert_eq!(vis.bucket_of(b.id, a.id), Some(LodBucket::Near));
        assert_eq!(vis.bucket_of(c.id, a.id), Some(LodBucket::Medium));

        assert!(vis.sees_at(b.id, a.id, LodLevel::Near));
        assert!(!vis.sees_at(c.id, a.id, LodLevel::Near));
        assert!(vis.sees_at(c.id, a.id, LodLevel::Medium));
        assert!(vis.sees_at(c.id, a.id, LodLevel::All));
    }

    #[test]
    fn an_object_is_in_at_most_one_bucket() {
        let (world, vis) = setup();

        let a = spawn(&world, &vis, (1 << 28) + 1, 0, 0);
        let b = spawn(&world, &vis, (1 << 28) + 2, CELL, CELL);

        vis.refresh_once();

        // Diagonal neighbor: far bucket only.
        assert_eq!(vis.bucket_of(a.id, b.id), Some(LodBucket::Far));
        assert!(vis.sees_at(a.id, b.id, LodLevel::Far));
        assert!(!vis.sees_at(a.id, b.id, LodLevel::Medium));
    }

    #[test]
    fn refresh_tracks_movement() {
        let (world, vis) = setup();

        let a = spawn(&world, &vis, (1 << 28) + 1, 0, 0);
        let b = spawn(&world, &vis, (1 << 28) + 2, 10, 10);

        vis.refresh_once();
        assert!(vis.sees(b.id, a.id));

        // A walks three cells away.
        world
            .move_object(a.id, Location::new(3 * CELL, 0, 0))
            .unwrap();

        // Stale until the next batch.
        assert!(vis.sees(b.id, a.id));

        vis.refresh_once();
        assert!(!vis.sees(b.id, a.id));
        assert!(vis.observers_of(a.id).is_empty());
    }

    #[test]
    fn unregister_invalidates_reverse_lookups() {
        let (world, vis) = setup();

        let a = spawn(&world, &vis, (1 << 28) + 1, 0, 0);
        let b = spawn(&world, &vis, (1 << 28) + 2, 10, 10);

        vis.refresh_once();
        assert_eq!(vis.observers_of(a.id), vec![b.id]);

        vis.unregister_player(b.id);

        assert!(vis.observers_of(a.id).is_empty());
        assert!(vis.observers_of(b.id).is_empty());
        assert!(!vis.is_registered(b.id));
    }
}
