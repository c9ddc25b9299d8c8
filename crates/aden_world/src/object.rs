//! World objects and the partitioned object-id space.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::player::Player;
use crate::region::Location;

/// First id of the player range; everything below is the item range.
pub const PLAYER_ID_FIRST: u32 = 1 << 28;

/// First id of the NPC range.
pub const NPC_ID_FIRST: u32 = 1 << 29;

/// A 32-bit world-unique object identifier.
///
/// The id space is partitioned: ids below [`PLAYER_ID_FIRST`] are items,
/// ids below [`NPC_ID_FIRST`] are players, and the rest are NPCs. Tagging
/// an id with its range lets routing code classify an entity without
/// looking the object up.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub const fn as_i32(self) -> i32 {
        self.0 as i32
    }

    pub const fn kind(self) -> ObjectKind {
        if self.0 >= NPC_ID_FIRST {
            ObjectKind::Npc
        } else if self.0 >= PLAYER_ID_FIRST {
            ObjectKind::Player
        } else {
            ObjectKind::Item
        }
    }

    pub const fn is_player(self) -> bool {
        matches!(self.kind(), ObjectKind::Player)
    }
}

/// The id-range class of an object id.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ObjectKind {
    Item,
    Player,
    Npc,
}

/// Distinguishes plain NPCs from attackable monsters.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NpcKind {
    Npc,
    Monster,
}

/// A spawned non-player creature.
pub struct Npc {
    pub id: ObjectId,
    pub template_id: i32,
    pub name: String,
    pub kind: NpcKind,
    pos: RwLock<Location>,
}

impl Npc {
    pub fn new(id: ObjectId, template_id: i32, name: impl Into<String>, kind: NpcKind, loc: Location) -> Self {
        Self {
            id,
            template_id,
            name: name.into(),
            kind,
            pos: RwLock::new(loc),
        }
    }

    pub fn location(&self) -> Location {
        *self.pos.read()
    }

    pub(crate) fn set_location(&self, loc: Location) {
        *self.pos.write() = loc;
    }
}

/// An item lying on the ground.
pub struct GroundItem {
    pub id: ObjectId,
    pub item_id: i32,
    pub count: i32,
    pos: RwLock<Location>,
}

impl GroundItem {
    pub fn new(id: ObjectId, item_id: i32, count: i32, loc: Location) -> Self {
        Self {
            id,
            item_id,
            count,
            pos: RwLock::new(loc),
        }
    }

    pub fn location(&self) -> Location {
        *self.pos.read()
    }

    pub(crate) fn set_location(&self, loc: Location) {
        *self.pos.write() = loc;
    }
}

/// A pet or summon bound to an owning player.
pub struct Servitor {
    pub id: ObjectId,
    pub owner: ObjectId,
    pub template_id: i32,
    pub name: String,
    pos: RwLock<Location>,
}

impl Servitor {
    pub fn new(id: ObjectId, owner: ObjectId, template_id: i32, name: impl Into<String>, loc: Location) -> Self {
        Self {
            id,
            owner,
            template_id,
            name: name.into(),
            pos: RwLock::new(loc),
        }
    }

    pub fn location(&self) -> Location {
        *self.pos.read()
    }

    pub(crate) fn set_location(&self, loc: Location) {
        *self.pos.write() = loc;
    }
}

/// Anything that occupies a place in the world. Clones share the
/// underlying object.
#[derive(Clone)]
pub enum WorldObject {
    Player(Arc<Player>),
    Npc(Arc<Npc>),
    Monster(Arc<Npc>),
    Item(Arc<GroundItem>),
    Pet(Arc<Servitor>),
    Summon(Arc<Servitor>),
}

impl WorldObject {
    pub fn id(&self) -> ObjectId {
        match self {
            WorldObject::Player(p) => p.id,
            WorldObject::Npc(n) | WorldObject::Monster(n) => n.id,
            WorldObject::Item(i) => i.id,
            WorldObject::Pet(s) | WorldObject::Summon(s) => s.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            WorldObject::Player(p) => &p.name,
            WorldObject::Npc(n) | WorldObject::Monster(n) => &n.name,
            WorldObject::Item(_) => "",
            WorldObject::Pet(s) | WorldObject::Summon(s) => &s.name,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            WorldObject::Player(p) => p.location(),
            WorldObject::Npc(n) | WorldObject::Monster(n) => n.location(),
            WorldObject::Item(i) => i.location(),
            WorldObject::Pet(s) | WorldObject::Summon(s) => s.location(),
        }
    }

    pub(crate) fn set_location(&self, loc: Location) {
        match self {
            WorldObject::Player(p) => p.set_location(loc),
            WorldObject::Npc(n) | WorldObject::Monster(n) => n.set_location(loc),
            WorldObject::Item(i) => i.set_location(loc),
            WorldObject::Pet(s) | WorldObject::Summon(s) => s.set_location(loc),
        }
    }

    pub fn as_player(&self) -> Option<&Arc<Player>> {
        match self {
            WorldObject::Player(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_ranges_partition_the_space() {
        assert_eq!(ObjectId(1).kind(), ObjectKind::Item);
        assert_eq!(ObjectId((1 << 28) - 1).kind(), ObjectKind::Item);
        assert_eq!(ObjectId(1 << 28).kind(), ObjectKind::Player);
        assert_eq!(ObjectId((1 << 29) - 1).kind(), ObjectKind::Player);
        assert_eq!(ObjectId(1 << 29).kind(), ObjectKind::Npc);
        assert_eq!(ObjectId(u32::MAX).kind(), ObjectKind::Npc);
    }
}
