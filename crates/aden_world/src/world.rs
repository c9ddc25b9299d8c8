//! The object store and its region grid.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::object::{ObjectId, WorldObject};
use crate::player::Player;
use crate::region::{Location, LodLevel, RegionPos};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("object id {0:?} is already spawned")]
    DuplicateObject(ObjectId),
    #[error("object id {0:?} is not in the world")]
    MissingObject(ObjectId),
}

#[derive(Default)]
struct RegionCell {
    objects: FxHashSet<ObjectId>,
}

#[derive(Default)]
struct Inner {
    objects: FxHashMap<ObjectId, WorldObject>,
    grid: FxHashMap<RegionPos, RegionCell>,
}

/// The world: an id-keyed object map plus a lazily grown 2D region grid.
/// Every object is present in exactly one region cell at any time; moves
/// across a cell boundary update both cells under one write lock.
#[derive(Default)]
pub struct World {
    inner: RwLock<Inner>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&self, obj: WorldObject) -> Result<(), WorldError> {
        let id = obj.id();
        let region = obj.location().region();

        let mut inner = self.inner.write();

        if inner.objects.contains_key(&id) {
            return Err(WorldError::DuplicateObject(id));
        }

        inner.objects.insert(id, obj);
        inner.grid.entry(region).or_default().objects.insert(id);

        Ok(())
    }

    pub fn remove_object(&self, id: ObjectId) -> Result<WorldObject, WorldError> {
        let mut inner = self.inner.write();

        let obj = inner
            .objects
            .remove(&id)
            .ok_or(WorldError::MissingObject(id))?;

        let region = obj.location().region();

        if let Some(cell) = inner.grid.get_mut(&region) {
            cell.objects.remove(&id);
        }

        Ok(obj)
    }

    /// Relocates an object, updating region membership atomically when the
    /// move crosses a cell boundary. Returns the previous location.
    pub fn move_object(&self, id: ObjectId, to: Location) -> Result<Location, WorldError> {
        let mut inner = self.inner.write();

        let obj = inner
            .objects
            .get(&id)
            .ok_or(WorldError::MissingObject(id))?
            .clone();

        let from = obj.location();
        let old_region = from.region();
        let new_region = to.region();

        obj.set_location(to);

        if old_region != new_region {
            if let Some(cell) = inner.grid.get_mut(&old_region) {
                cell.objects.remove(&id);
            }

            inner.grid.entry(new_region).or_default().objects.insert(id);
        }

        Ok(from)
    }

    pub fn get(&self, id: ObjectId) -> Option<WorldObject> {
        self.inner.read().objects.get(&id).cloned()
    }

    pub fn get_player(&self, id: ObjectId) -> Option<Arc<Player>> {
        match self.inner.read().objects.get(&id) {
            Some(WorldObject::Player(p)) => Some(p.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.inner.read().objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().objects.is_empty()
    }

    /// Whether the grid currently files `id` under `region`. Intended for
    /// diagnostics and tests; gameplay code asks through locations.
    pub fn region_contains(&self, region: RegionPos, id: ObjectId) -> bool {
        self.inner
            .read()
            .grid
            .get(&region)
            .is_some_and(|cell| cell.objects.contains(&id))
    }

    /// Ids filed under one region cell.
    pub fn snapshot_region(&self, region: RegionPos) -> Vec<ObjectId> {
        self.inner
            .read()
            .grid
            .get(&region)
            .map(|cell| cell.objects.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Visits every object in the cells covered by `lod` around the world
    /// position `(x, y)`. The visitor returns `false` to stop early.
    ///
    /// The read lock is held for the whole scan; visitors must not call
    /// back into world mutations.
    pub fn for_each_visible_object(
        &self,
        x: i32,
        y: i32,
        lod: LodLevel,
        mut visit: impl FnMut(&WorldObject) -> bool,
    ) {
        let center = RegionPos::from_world(x, y);
        let inner = self.inner.read();

        for &(dx, dy) in lod.offsets() {
            let Some(cell) = inner.grid.get(&center.offset(dx, dy)) else {
                continue;
            };

            for id in &cell.objects {
                if let Some(obj) = inner.objects.get(id) {
                    if !visit(obj) {
                        return;
                    }
                }
            }
        }
    }

    /// Drops every object. Part of server teardown.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.objects.clear();
        inner.grid.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerStats;

    fn spawn_player(world: &World, id: u32, x: i32, y: i32) -> Arc<Player> {
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

        player
    }

    #[test]
    fn object_ids_are_unique() {
        let world = World::new();
        let p = spawn_player(&world, 1 << 28, 0, 0);

        assert_eq!(
            world.add_object(WorldObject::Player(p.clone())),
            Err(WorldError::DuplicateObject(p.id))
        );
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn an_object_lives_in_exactly_one_cell() {
        let world = World::new();
        let p = spawn_player(&world, 1 << 28, 100, 100);

        let home = RegionPos::from_world(100, 100);
        assert!(world.region_contains(home, p.id));

        // Move within the cell: membership unchanged.
        world.move_object(p.id, Location::new(200, 300, 0)).unwrap();
        assert!(world.region_contains(home, p.id));

        // Move across the boundary: the old cell forgets the object.
        let far = Location::new(100 + (2 << 12), 100, 0);
        world.move_object(p.id, far).unwrap();

        assert!(!world.region_contains(home, p.id));
        assert!(world.region_contains(far.region(), p.id));
        assert_eq!(p.location(), far);
    }

    #[test]
    fn remove_clears_both_indices() {
        let world = World::new();
        let p = spawn_player(&world, 1 << 28, 0, 0);
        let region = p.location().region();

        world.remove_object(p.id).unwrap();

        assert!(world.get(p.id).is_none());
        assert!(!world.region_contains(region, p.id));
        assert_eq!(
            world.remove_object(p.id),
            Err(WorldError::MissingObject(p.id))
        );
    }

    #[test]
    fn visibility_scan_covers_the_requested_cells() {
        let world = World::new();
        let cell = 1 << 12;

        // Center, edge-adjacent, diagonal, and out of range.
        spawn_player(&world, (1 << 28) + 1, 0, 0);
        spawn_player(&world, (1 << 28) + 2, cell, 0);
        spawn_player(&world, (1 << 28) + 3, cell, cell);
        spawn_player(&world, (1 << 28) + 4, 3 * cell, 0);

        let collect = |lod| {
            let mut seen = Vec::new();
            world.for_each_visible_object(0, 0, lod, |obj| {
                seen.push(obj.id().0 - (1 << 28));
                true
            });
            seen.sort_unstable();
            seen
        };

        assert_eq!(collect(LodLevel::Near), vec![1]);
        assert_eq!(collect(LodLevel::Medium), vec![1, 2]);
        assert_eq!(collect(LodLevel::Far), vec![1, 3]);
        assert_eq!(collect(LodLevel::All), vec![1, 2, 3]);
    }

    #[test]
    fn visitor_can_stop_early() {
        let world = World::new();
        spawn_player(&world, (1 << 28) + 1, 0, 0);
        spawn_player(&world, (1 << 28) + 2, 10, 10);

        let mut count = 0;
        world.for_each_visible_object(0, 0, LodLevel::All, |_| {
            count += 1;
            false
        });

        assert_eq!(count, 1);
    }
}
