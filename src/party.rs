//! The party registry.
//!
//! Parties live here, keyed by party id; players carry only the id. The
//! registry enforces the structural invariants (size cap, one party per
//! member, disband below two members); the handlers own the packet
//! choreography.

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use aden_world::{ObjectId, PartyId};

pub const MAX_PARTY_MEMBERS: usize = 9;

/// Loot distribution rules, as the client numbers them.
pub mod loot {
    pub const FINDERS_KEEPERS: i32 = 0;
    pub const RANDOM: i32 = 1;
    pub const RANDOM_INCLUDING_SPOIL: i32 = 2;
    pub const BY_TURN: i32 = 3;
    pub const BY_TURN_INCLUDING_SPOIL: i32 = 4;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum PartyError {
    #[error("party not found")]
    NotFound,
    #[error("party is full")]
    Full,
    #[error("player is already in a party")]
    AlreadyInParty,
    #[error("player is not in this party")]
    NotAMember,
    #[error("only the leader may do that")]
    NotLeader,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Party {
    pub id: PartyId,
    pub leader: ObjectId,
    pub members: Vec<ObjectId>,
    pub loot_rule: i32,
}

impl Party {
    pub fn contains(&self, id: ObjectId) -> bool {
        self.members.contains(&id)
    }
}

/// What `remove_member` left behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The party lives on with the listed members (leader first).
    Remaining(Party),
    /// Fewer than two members were left; the party disbanded and the
    /// listed players were released.
    Disbanded(Vec<ObjectId>),
}

#[derive(Default)]
pub struct PartyRegistry {
    parties: RwLock<FxHashMap<PartyId, Party>>,
    next_id: AtomicU32,
}

impl PartyRegistry {
    pub fn new() -> Self {
        Self {
            parties: RwLock::new(FxHashMap::default()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Creates a party of two. The caller guarantees neither player is in
    /// a party yet (their `party_id` slots are empty).
    pub fn create(&self, leader: ObjectId, second: ObjectId, loot_rule: i32) -> Party {
        let id = PartyId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let party = Party {
            id,
            leader,
            members: vec![leader, second],
            loot_rule,
        };

        self.parties.write().insert(id, party.clone());
        party
    }

    pub fn add_member(&self, id: PartyId, member: ObjectId) -> Result<Party, PartyError> {
        let mut parties = self.parties.write();
        let party = parties.get_mut(&id).ok_or(PartyError::NotFound)?;

        if party.members.len() >= MAX_PARTY_MEMBERS {
            return Err(PartyError::Full);
        }

        if party.contains(member) {
            return Err(PartyError::AlreadyInParty);
        }

        party.members.push(member);
        Ok(party.clone())
    }

    /// Removes a member. Below two members the party disbands and every
    /// remaining id is handed back for cleanup.
    pub fn remove_member(&self, id: PartyId, member: ObjectId) -> Result<RemoveOutcome, PartyError> {
        let mut parties = self.parties.write();
        let party = parties.get_mut(&id).ok_or(PartyError::NotFound)?;

        let at = party
            .members
            .iter()
            .position(|&m| m == member)
            .ok_or(PartyError::NotAMember)?;

        party.members.remove(at);

        if party.members.len() < 2 {
            let disbanded = parties.remove(&id).expect("present above");
            return Ok(RemoveOutcome::Disbanded(disbanded.members));
        }

        if party.leader == member {
            party.leader = party.members[0];
        }

        Ok(RemoveOutcome::Remaining(party.clone()))
    }

    pub fn set_leader(&self, id: PartyId, leader: ObjectId) -> Result<Party, PartyError> {
        let mut parties = self.parties.write();
        let party = parties.get_mut(&id).ok_or(PartyError::NotFound)?;

        if !party.contains(leader) {
            return Err(PartyError::NotAMember);
        }

        party.leader = leader;
        Ok(party.clone())
    }

    pub fn get(&self, id: PartyId) -> Option<Party> {
        self.parties.read().get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.parties.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(n: u32) -> ObjectId {
        ObjectId((1 << 28) + n)
    }

    #[test]
    fn create_then_grow_to_the_cap() {
        let registry = PartyRegistry::new();
        let party = registry.create(oid(1), oid(2), loot::FINDERS_KEEPERS);

        for n in 3..=MAX_PARTY_MEMBERS as u32 {
            registry.add_member(party.id, oid(n)).unwrap();
        }

        assert_eq!(
            registry.add_member(party.id, oid(100)),
            Err(PartyError::Full)
        );
        assert_eq!(
            registry.get(party.id).unwrap().members.len(),
            MAX_PARTY_MEMBERS
        );
    }

    #[test]
    fn duplicate_members_are_rejected() {
        let registry = PartyRegistry::new();
        let party = registry.create(oid(1), oid(2), loot::RANDOM);

        assert_eq!(
            registry.add_member(party.id, oid(2)),
            Err(PartyError::AlreadyInParty)
        );
    }

    #[test]
    fn dropping_to_one_member_disbands() {
        let registry = PartyRegistry::new();
        let party = registry.create(oid(1), oid(2), loot::RANDOM);

        let outcome = registry.remove_member(party.id, oid(2)).unwrap();
        assert_eq!(outcome, RemoveOutcome::Disbanded(vec![oid(1)]));
        assert!(registry.get(party.id).is_none());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn leader_leaving_promotes_the_next_member() {
        let registry = PartyRegistry::new();
        let party = registry.create(oid(1), oid(2), loot::RANDOM);
        registry.add_member(party.id, oid(3)).unwrap();

        let outcome = registry.remove_member(party.id, oid(1)).unwrap();

        match outcome {
            RemoveOutcome::Remaining(party) => {
                assert_eq!(party.leader, oid(2));
                assert_eq!(party.members, vec![oid(2), oid(3)]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn explicit_leader_change() {
        let registry = PartyRegistry::new();
        let party = registry.create(oid(1), oid(2), loot::RANDOM);

        assert_eq!(
            registry.set_leader(party.id, oid(9)),
            Err(PartyError::NotAMember)
        );

        let party = registry.set_leader(party.id, oid(2)).unwrap();
        assert_eq!(party.leader, oid(2));
    }
}
