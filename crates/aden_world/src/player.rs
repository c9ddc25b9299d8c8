//! The player character model.
//!
//! A `Player` is shared between its connection task, the visibility batch
//! pass and broadcast fan-out, so every mutable part sits behind its own
//! small lock. Party and clan membership are id references into the
//! registries that own them; the player never holds the other side of
//! those relationships directly.

use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use crate::object::ObjectId;
use crate::region::Location;

/// Identifier of a party in the party registry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct PartyId(pub u32);

/// Identifier of a clan in the clan table.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ClanId(pub u32);

/// Character sheet values loaded from persistence.
#[derive(Copy, Clone, Default, Debug)]
pub struct PlayerStats {
    pub race: i32,
    pub sex: i32,
    pub class_id: i32,
    pub level: i32,
    pub exp: i64,
    pub sp: i32,
    pub karma: i32,
}

/// Current and maximum vitals.
#[derive(Copy, Clone, Debug)]
pub struct Vitals {
    pub cur_hp: i32,
    pub max_hp: i32,
    pub cur_mp: i32,
    pub max_mp: i32,
    pub cur_cp: i32,
    pub max_cp: i32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            cur_hp: 100,
            max_hp: 100,
            cur_mp: 100,
            max_mp: 100,
            cur_cp: 0,
            max_cp: 0,
        }
    }
}

/// One item in a player's inventory.
#[derive(Copy, Clone, Debug)]
pub struct OwnedItem {
    pub object_id: ObjectId,
    pub item_id: i32,
    pub count: i32,
    /// Paperdoll slot when equipped, -1 otherwise.
    pub equip_slot: i32,
    pub enchant_level: i16,
}

/// Sitting state.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Stance {
    #[default]
    Standing,
    Sitting,
}

/// Private store marker. The core only gates on it; store contents and
/// pricing are gameplay rules.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum PrivateStore {
    #[default]
    None,
    Sell,
    SellManage,
    Buy,
    BuyManage,
    Manufacture,
    ManufactureManage,
}

impl PrivateStore {
    /// The marker byte shown to clients.
    pub fn wire_value(self) -> u8 {
        match self {
            PrivateStore::None => 0,
            PrivateStore::Sell => 1,
            PrivateStore::SellManage => 2,
            PrivateStore::Buy => 3,
            PrivateStore::BuyManage => 4,
            PrivateStore::Manufacture => 5,
            PrivateStore::ManufactureManage => 6,
        }
    }

    /// Any store mode blocks social actions, item use and the like.
    pub fn is_active(self) -> bool {
        self != PrivateStore::None
    }
}

/// A pending party invitation on the invitee.
#[derive(Copy, Clone, Debug)]
pub struct PartyInvite {
    pub from: ObjectId,
    pub loot_rule: i32,
}

/// A pending duel challenge on the challenged player.
#[derive(Copy, Clone, Debug)]
pub struct DuelInvite {
    pub from: ObjectId,
    pub party_duel: bool,
}

pub struct Player {
    pub id: ObjectId,
    /// Persistent character id. Never used as a runtime index; every
    /// registry and cache keys on [`ObjectId`].
    pub char_id: i32,
    pub account: String,
    pub name: String,
    pub title: String,
    pub stats: PlayerStats,
    pub access_level: i32,
    pub walk_speed: i32,
    pub run_speed: i32,

    pos: RwLock<Location>,
    vitals: Mutex<Vitals>,
    inventory: Mutex<Vec<OwnedItem>>,

    party_id: Mutex<Option<PartyId>>,
    clan_id: Mutex<Option<ClanId>>,
    duel_id: Mutex<Option<u32>>,

    party_invite: Mutex<Option<PartyInvite>>,
    duel_invite: Mutex<Option<DuelInvite>>,

    target: Mutex<Option<ObjectId>>,
    stance: Mutex<Stance>,
    private_store: Mutex<PrivateStore>,
    last_social: Mutex<Option<Instant>>,
}

impl Player {
    pub fn new(
        id: ObjectId,
        char_id: i32,
        account: impl Into<String>,
        name: impl Into<String>,
        stats: PlayerStats,
        loc: Location,
    ) -> Self {
        Self {
            id,
            char_id,
            account: account.into(),
            name: name.into(),
            title: String::new(),
            stats,
            access_level: 0,
            walk_speed: 80,
            run_speed: 120,
            pos: RwLock::new(loc),
            vitals: Mutex::new(Vitals::default()),
            inventory: Mutex::new(Vec::new()),
            party_id: Mutex::new(None),
            clan_id: Mutex::new(None),
            duel_id: Mutex::new(None),
            party_invite: Mutex::new(None),
            duel_invite: Mutex::new(None),
            target: Mutex::new(None),
            stance: Mutex::new(Stance::Standing),
            private_store: Mutex::new(PrivateStore::None),
            last_social: Mutex::new(None),
        }
    }

    pub fn location(&self) -> Location {
        *self.pos.read()
    }

    pub(crate) fn set_location(&self, loc: Location) {
        *self.pos.write() = loc;
    }

    pub fn vitals(&self) -> Vitals {
        *self.vitals.lock()
    }

    pub fn set_vitals(&self, vitals: Vitals) {
        *self.vitals.lock() = vitals;
    }

    pub fn inventory(&self) -> Vec<OwnedItem> {
        self.inventory.lock().clone()
    }

    pub fn set_inventory(&self, items: Vec<OwnedItem>) {
        *self.inventory.lock() = items;
    }

    pub fn find_item(&self, object_id: ObjectId) -> Option<OwnedItem> {
        self.inventory
            .lock()
            .iter()
            .find(|item| item.object_id == object_id)
            .copied()
    }

    pub fn party_id(&self) -> Option<PartyId> {
        *self.party_id.lock()
    }

    pub fn set_party_id(&self, id: Option<PartyId>) {
        *self.party_id.lock() = id;
    }

    pub fn clan_id(&self) -> Option<ClanId> {
        *self.clan_id.lock()
    }

    pub fn set_clan_id(&self, id: Option<ClanId>) {
        *self.clan_id.lock() = id;
    }

    pub fn duel_id(&self) -> Option<u32> {
        *self.duel_id.lock()
    }

    pub fn set_duel_id(&self, id: Option<u32>) {
        *self.duel_id.lock() = id;
    }

    /// Stores a party invite unless one is already pending. Returns false
    /// when the slot is occupied.
    pub fn offer_party_invite(&self, invite: PartyInvite) -> bool {
        let mut slot = self.party_invite.lock();

        if slot.is_some() {
            return false;
        }

        *slot = Some(invite);
        true
    }

    pub fn take_party_invite(&self) -> Option<PartyInvite> {
        self.party_invite.lock().take()
    }

    pub fn offer_duel_invite(&self, invite: DuelInvite) -> bool {
        let mut slot = self.duel_invite.lock();

        if slot.is_some() {
            return false;
        }

        *slot = Some(invite);
        true
    }

    pub fn take_duel_invite(&self) -> Option<DuelInvite> {
        self.duel_invite.lock().take()
    }

    pub fn target(&self) -> Option<ObjectId> {
        *self.target.lock()
    }

    pub fn set_target(&self, target: Option<ObjectId>) {
        *self.target.lock() = target;
    }

    pub fn stance(&self) -> Stance {
        *self.stance.lock()
    }

    pub fn set_stance(&self, stance: Stance) {
        *self.stance.lock() = stance;
    }

    pub fn private_store(&self) -> PrivateStore {
        *self.private_store.lock()
    }

    pub fn set_private_store(&self, store: PrivateStore) {
        *self.private_store.lock() = store;
    }

    /// Rate limiter for social actions: succeeds at most once per
    /// `min_interval`.
    pub fn try_social_action(&self, min_interval: Duration) -> bool {
        let mut last = self.last_social.lock();
        let now = Instant::now();

        match *last {
            Some(at) if now.duration_since(at) < min_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_player() -> Player {
        Player::new(
            ObjectId(1 << 28),
            7,
            "acct",
            "Fira",
            PlayerStats::default(),
            Location::new(0, 0, 0),
        )
    }

    #[test]
    fn invite_slot_holds_one_offer() {
        let p = test_player();

        assert!(p.offer_party_invite(PartyInvite {
            from: ObjectId(5),
            loot_rule: 0
        }));
        assert!(!p.offer_party_invite(PartyInvite {
            from: ObjectId(6),
            loot_rule: 0
        }));

        let invite = p.take_party_invite().expect("offer stored");
        assert_eq!(invite.from, ObjectId(5));
        assert!(p.take_party_invite().is_none());
    }

    #[test]
    fn social_action_rate_limits() {
        let p = test_player();

        assert!(p.try_social_action(Duration::from_secs(2)));
        assert!(!p.try_social_action(Duration::from_secs(2)));
        assert!(p.try_social_action(Duration::ZERO));
    }
}
