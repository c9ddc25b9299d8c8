//! The three-index client registry.
//!
//! `by_account`, `by_player` (character name) and `by_object_id` live
//! behind one RW lock and always change together. The player-side keys
//! are the runtime [`ObjectId`] — the same id the world and the
//! visibility reverse index publish — never the persistent character id.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use aden_world::{ObjectId, Player};

use crate::client::ClientHandle;

#[derive(Default)]
struct Indexes {
    by_account: HashMap<String, Arc<ClientHandle>>,
    by_player: HashMap<String, Arc<ClientHandle>>,
    by_object_id: FxHashMap<ObjectId, Arc<ClientHandle>>,
}

#[derive(Default)]
pub struct ClientRegistry {
    inner: RwLock<Indexes>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `conn` to `account`. Last writer wins: a connection already
    /// holding the account is displaced, closed, and returned so the
    /// caller can log or await its teardown.
    pub fn register_account(
        &self,
        account: &str,
        conn: &Arc<ClientHandle>,
    ) -> Option<Arc<ClientHandle>> {
        let mut inner = self.inner.write();

        let displaced = inner
            .by_account
            .insert(account.to_owned(), conn.clone())
            .filter(|old| old.conn_id() != conn.conn_id());

        if let Some(old) = &displaced {
            // Purge the loser's player entries before it observes the
            // close, so no index can hand it out afterwards.
            if let Some(player) = old.player() {
                inner.by_player.remove(&player.name);
                inner.by_object_id.remove(&player.id);
            }

            debug!(
                account,
                old_conn = old.conn_id(),
                new_conn = conn.conn_id(),
                "displacing previous connection for account"
            );
            old.close();
        }

        displaced
    }

    /// Removes the account binding, but only while `conn` still owns it;
    /// a stale disconnect never evicts the connection that displaced it.
    /// The matching player entries are purged in the same critical
    /// section.
    pub fn unregister_account(&self, account: &str, conn: &Arc<ClientHandle>) {
        let mut inner = self.inner.write();

        let owned = inner
            .by_account
            .get(account)
            .is_some_and(|cur| cur.conn_id() == conn.conn_id());

        if !owned {
            return;
        }

        inner.by_account.remove(account);

        if let Some(player) = conn.player() {
            inner.by_player.remove(&player.name);
            inner.by_object_id.remove(&player.id);
        }
    }

    /// Publishes a spawned player under its name and object id.
    pub fn register_player(&self, player: &Arc<Player>, conn: &Arc<ClientHandle>) {
        let mut inner = self.inner.write();
        inner.by_player.insert(player.name.clone(), conn.clone());
        inner.by_object_id.insert(player.id, conn.clone());
    }

    /// Removes a player's entries; the account binding stays.
    pub fn unregister_player(&self, player: &Player) {
        let mut inner = self.inner.write();
        inner.by_player.remove(&player.name);
        inner.by_object_id.remove(&player.id);
    }

    pub fn get_by_account(&self, account: &str) -> Option<Arc<ClientHandle>> {
        self.inner.read().by_account.get(account).cloned()
    }

    pub fn get_by_player_name(&self, name: &str) -> Option<Arc<ClientHandle>> {
        self.inner.read().by_player.get(name).cloned()
    }

    pub fn get_by_object_id(&self, id: ObjectId) -> Option<Arc<ClientHandle>> {
        self.inner.read().by_object_id.get(&id).cloned()
    }

    pub fn client_count(&self) -> usize {
        self.inner.read().by_account.len()
    }

    pub fn player_count(&self) -> usize {
        self.inner.read().by_object_id.len()
    }

    /// Visits every connected account under the read lock. The visitor
    /// returns `false` to stop, and must not reenter registry writes.
    pub fn for_each_client(&self, mut visit: impl FnMut(&Arc<ClientHandle>) -> bool) {
        let inner = self.inner.read();

        for conn in inner.by_account.values() {
            if !visit(conn) {
                break;
            }
        }
    }

    /// Visits every spawned player under the read lock.
    pub fn for_each_player(&self, mut visit: impl FnMut(&Arc<Player>, &Arc<ClientHandle>) -> bool) {
        let inner = self.inner.read();

        for conn in inner.by_object_id.values() {
            if let Some(player) = conn.player() {
                if !visit(&player, conn) {
                    break;
                }
            }
        }
    }

    /// Empties all three indices and returns the distinct connections
    /// that were registered; used by graceful shutdown.
    pub fn drain(&self) -> Vec<Arc<ClientHandle>> {
        let mut inner = self.inner.write();

        let mut all: Vec<Arc<ClientHandle>> = Vec::with_capacity(inner.by_account.len());

        for conn in inner.by_account.values() {
            if !all.iter().any(|c| c.conn_id() == conn.conn_id()) {
                all.push(conn.clone());
            }
        }

        inner.by_account.clear();
        inner.by_player.clear();
        inner.by_object_id.clear();

        all
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aden_world::{Location, PlayerStats};

    use super::*;
    use crate::client::detached_handle;

    fn addr() -> std::net::SocketAddr {
        "127.0.0.1:7777".parse().unwrap()
    }

    fn player(id: u32, name: &str) -> Arc<Player> {
        Arc::new(Player::new(
            ObjectId(id),
            id as i32,
            "acct",
            name,
            PlayerStats::default(),
            Location::new(0, 0, 0),
        ))
    }

    #[test]
    fn reconnect_displaces_and_closes_the_loser() {
        let registry = ClientRegistry::new();
        let (c1, _rx1) = detached_handle(addr(), 8);
        let (c2, _rx2) = detached_handle(addr(), 8);

        assert!(registry.register_account("acct", &c1).is_none());

        let displaced = registry.register_account("acct", &c2).expect("c1 evicted");
        assert_eq!(displaced.conn_id(), c1.conn_id());
        assert!(c1.is_closed());
        assert!(!c2.is_closed());

        let current = registry.get_by_account("acct").unwrap();
        assert_eq!(current.conn_id(), c2.conn_id());
    }

    #[test]
    fn unregister_purges_player_entries() {
        let registry = ClientRegistry::new();
        let (conn, _rx) = detached_handle(addr(), 8);
        let p = player((1 << 28) + 7, "Fira");

        registry.register_account("acct", &conn);
        conn.bind_player(p.clone());
        registry.register_player(&p, &conn);

        assert!(registry.get_by_player_name("Fira").is_some());
        assert!(registry.get_by_object_id(p.id).is_some());

        registry.unregister_account("acct", &conn);

        assert!(registry.get_by_account("acct").is_none());
        assert!(registry.get_by_player_name("Fira").is_none());
        assert!(registry.get_by_object_id(p.id).is_none());
    }

    #[test]
    fn unregister_player_leaves_the_account() {
        let registry = ClientRegistry::new();
        let (conn, _rx) = detached_handle(addr(), 8);
        let p = player((1 << 28) + 7, "Fira");

        registry.register_account("acct", &conn);
        conn.bind_player(p.clone());
        registry.register_player(&p, &conn);

        registry.unregister_player(&p);

        assert!(registry.get_by_player_name("Fira").is_none());
        assert!(registry.get_by_object_id(p.id).is_none());
        assert!(registry.get_by_account("acct").is_some());
    }

    #[test]
    fn stale_disconnect_does_not_evict_the_winner() {
        let registry = ClientRegistry::new();
        let (c1, _rx1) = detached_handle(addr(), 8);
        let (c2, _rx2) = detached_handle(addr(), 8);

        registry.register_account("acct", &c1);
        registry.register_account("acct", &c2);

        // c1's teardown runs late; the account must stay with c2.
        registry.unregister_account("acct", &c1);
        assert!(registry.get_by_account("acct").is_some());
    }

    #[test]
    fn drain_empties_every_index() {
        let registry = ClientRegistry::new();
        let (c1, _rx1) = detached_handle(addr(), 8);
        let (c2, _rx2) = detached_handle(addr(), 8);
        let p = player((1 << 28) + 1, "Fira");

        registry.register_account("a", &c1);
        registry.register_account("b", &c2);
        c1.bind_player(p.clone());
        registry.register_player(&p, &c1);

        let drained = registry.drain();

        assert_eq!(drained.len(), 2);
        assert_eq!(registry.client_count(), 0);
        assert_eq!(registry.player_count(), 0);
        assert!(registry.get_by_player_name("Fira").is_none());
    }

    #[test]
    fn visitors_can_stop_early() {
        let registry = ClientRegistry::new();
        let (c1, _rx1) = detached_handle(addr(), 8);
        let (c2, _rx2) = detached_handle(addr(), 8);

        registry.register_account("a", &c1);
        registry.register_account("b", &c2);

        let mut seen = 0;
        registry.for_each_client(|_| {
            seen += 1;
            false
        });

        assert_eq!(seen, 1);
    }
}
