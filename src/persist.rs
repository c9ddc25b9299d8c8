//! Persistence consumed as interfaces.
//!
//! The core does not assume a backing store: it loads characters when an
//! account authenticates, saves players on logout, and reads friend and
//! block sets. Saves are idempotent snapshots. The in-memory
//! implementations back tests and local single-process play.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use aden_world::{Location, ObjectId, Player, PlayerStats, Vitals};

/// One persisted character, in account slot order.
#[derive(Clone, Debug)]
pub struct CharacterRecord {
    pub char_id: i32,
    pub name: String,
    pub title: String,
    pub stats: PlayerStats,
    pub vitals: Vitals,
    pub location: Location,
    pub items: Vec<aden_world::player::OwnedItem>,
    pub access_level: i32,
}

impl CharacterRecord {
    /// Materializes the record into a live player under a fresh runtime
    /// object id.
    pub fn into_player(self, id: ObjectId, account: &str) -> Player {
        let mut player = Player::new(id, self.char_id, account, self.name, self.stats, self.location);
        player.title = self.title;
        player.access_level = self.access_level;
        player.set_vitals(self.vitals);
        player.set_inventory(self.items);
        player
    }
}

#[async_trait]
pub trait CharacterRepository: Send + Sync + 'static {
    async fn load_by_account(&self, account: &str) -> anyhow::Result<Vec<CharacterRecord>>;
}

#[async_trait]
pub trait PlayerPersister: Send + Sync + 'static {
    async fn save_player(&self, player: &Player) -> anyhow::Result<()>;
}

/// Friend and block lists for one character.
#[derive(Clone, Debug, Default)]
pub struct FriendSets {
    pub friends: Vec<String>,
    pub blocked: Vec<String>,
}

#[async_trait]
pub trait FriendStore: Send + Sync + 'static {
    async fn load(&self, char_id: i32) -> anyhow::Result<FriendSets>;
    async fn save(&self, char_id: i32, sets: &FriendSets) -> anyhow::Result<()>;
}

/// Account-keyed character fixtures.
#[derive(Default)]
pub struct InMemoryCharacters {
    accounts: RwLock<HashMap<String, Vec<CharacterRecord>>>,
}

impl InMemoryCharacters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_character(&self, account: &str, record: CharacterRecord) {
        self.accounts
            .write()
            .entry(account.to_owned())
            .or_default()
            .push(record);
    }
}

#[async_trait]
impl CharacterRepository for InMemoryCharacters {
    async fn load_by_account(&self, account: &str) -> anyhow::Result<Vec<CharacterRecord>> {
        Ok(self
            .accounts
            .read()
            .get(account)
            .cloned()
            .unwrap_or_default())
    }
}

/// Records save calls; tests assert on them.
#[derive(Default)]
pub struct InMemoryPersister {
    saves: RwLock<HashMap<i32, u32>>,
}

impl InMemoryPersister {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn save_count(&self, char_id: i32) -> u32 {
        self.saves.read().get(&char_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PlayerPersister for InMemoryPersister {
    async fn save_player(&self, player: &Player) -> anyhow::Result<()> {
        *self.saves.write().entry(player.char_id).or_insert(0) += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFriends {
    sets: RwLock<HashMap<i32, FriendSets>>,
}

impl InMemoryFriends {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_blocked(&self, char_id: i32, blocked: Vec<String>) {
        self.sets.write().entry(char_id).or_default().blocked = blocked;
    }
}

#[async_trait]
impl FriendStore for InMemoryFriends {
    async fn load(&self, char_id: i32) -> anyhow::Result<FriendSets> {
        Ok(self.sets.read().get(&char_id).cloned().unwrap_or_default())
    }

    async fn save(&self, char_id: i32, sets: &FriendSets) -> anyhow::Result<()> {
        self.sets.write().insert(char_id, sets.clone());
        Ok(())
    }
}
