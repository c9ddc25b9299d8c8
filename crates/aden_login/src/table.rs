//! The registered game-server table and its free-id bitmap.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

/// Valid server ids are 1..=127; a u128 bitmap covers the whole range
/// with an O(1) first-free-bit allocation.
const ID_MASK: u128 = !1;

/// Registration and client-admission refusals, each with its wire reason
/// code on the control stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ControlFail {
    #[error("hex id does not match the registered server")]
    WrongHexId,
    #[error("server id is reserved")]
    IdReserved,
    #[error("no free server id")]
    NoFreeId,
    #[error("game server is not authenticated")]
    NotAuthed,
    #[error("account is already logged in")]
    AlreadyLoggedIn,
    #[error("ip address is banned")]
    IpBanned,
}

impl ControlFail {
    pub const fn reason_code(self) -> i32 {
        match self {
            ControlFail::WrongHexId => 0x01,
            ControlFail::IdReserved => 0x02,
            ControlFail::NoFreeId => 0x03,
            ControlFail::NotAuthed => 0x04,
            ControlFail::AlreadyLoggedIn => 0x05,
            ControlFail::IpBanned => 0x06,
        }
    }

    pub const fn from_reason_code(code: i32) -> Option<Self> {
        Some(match code {
            0x01 => ControlFail::WrongHexId,
            0x02 => ControlFail::IdReserved,
            0x03 => ControlFail::NoFreeId,
            0x04 => ControlFail::NotAuthed,
            0x05 => ControlFail::AlreadyLoggedIn,
            0x06 => ControlFail::IpBanned,
            _ => return None,
        })
    }
}

/// Advertised load state of a game server.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ServerStatus {
    #[default]
    Auto,
    Good,
    Normal,
    Full,
    Down,
    GmOnly,
}

#[derive(Clone, Debug)]
pub struct GameServerInfo {
    pub id: u8,
    /// Shared secret identifying the server across reconnects.
    pub hex_id: Vec<u8>,
    pub host: String,
    pub port: u16,
    pub max_players: i32,
    pub status: ServerStatus,
    pub authed: bool,
}

#[derive(Default)]
struct TableInner {
    servers: HashMap<u8, GameServerInfo>,
    used: u128,
}

#[derive(Default)]
pub struct GameServerTable {
    inner: RwLock<TableInner>,
}

impl GameServerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a server known from the persisted table. Ignores entries
    /// with out-of-range ids.
    pub fn register_persisted(&self, info: GameServerInfo) {
        if info.id == 0 {
            return;
        }

        let mut inner = self.inner.write();
        inner.used |= 1u128 << info.id;
        inner.servers.insert(info.id, info);
    }

    /// First free id, without claiming it.
    pub fn peek_free_id(&self) -> Result<u8, ControlFail> {
        let inner = self.inner.read();
        first_free(inner.used)
    }

    /// Authenticates a game server link.
    ///
    /// A known id re-authenticates when the hex id matches byte for byte.
    /// A mismatching hex id on a taken id falls through to allocation
    /// when the peer accepts an alternate id, otherwise the id counts as
    /// reserved.
    pub fn auth(
        &self,
        desired_id: u8,
        accept_alternate: bool,
        hex_id: &[u8],
        host: &str,
        port: u16,
        max_players: i32,
    ) -> Result<u8, ControlFail> {
        let mut inner = self.inner.write();

        let reusable = (1..=127).contains(&desired_id);

        if reusable {
            if let Some(existing) = inner.servers.get_mut(&desired_id) {
                if existing.hex_id == hex_id {
                    existing.host = host.to_owned();
                    existing.port = port;
                    existing.max_players = max_players;
                    existing.authed = true;
                    return Ok(desired_id);
                }

                if !accept_alternate {
                    return Err(ControlFail::IdReserved);
                }
            } else {
                inner.used |= 1u128 << desired_id;
                inner.servers.insert(
                    desired_id,
                    GameServerInfo {
                        id: desired_id,
                        hex_id: hex_id.to_vec(),
                        host: host.to_owned(),
                        port,
                        max_players,
                        status: ServerStatus::Auto,
                        authed: true,
                    },
                );
                return Ok(desired_id);
            }
        } else if !accept_alternate {
            return Err(ControlFail::WrongHexId);
        }

        let id = first_free(inner.used)?;
        inner.used |= 1u128 << id;
        inner.servers.insert(
            id,
            GameServerInfo {
                id,
                hex_id: hex_id.to_vec(),
                host: host.to_owned(),
                port,
                max_players,
                status: ServerStatus::Auto,
                authed: true,
            },
        );

        Ok(id)
    }

    pub fn is_authed(&self, id: u8) -> bool {
        self.inner
            .read()
            .servers
            .get(&id)
            .is_some_and(|s| s.authed)
    }

    /// Marks a server down when its control link drops. The id stays
    /// reserved for its hex id.
    pub fn mark_down(&self, id: u8) {
        if let Some(server) = self.inner.write().servers.get_mut(&id) {
            server.authed = false;
            server.status = ServerStatus::Down;
        }
    }

    pub fn get(&self, id: u8) -> Option<GameServerInfo> {
        self.inner.read().servers.get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.inner.read().servers.len()
    }
}

fn first_free(used: u128) -> Result<u8, ControlFail> {
    let free = !used & ID_MASK;

    if free == 0 {
        return Err(ControlFail::NoFreeId);
    }

    Ok(free.trailing_zeros() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: u8, hex: &[u8]) -> GameServerInfo {
        GameServerInfo {
            id,
            hex_id: hex.to_vec(),
            host: "127.0.0.1".into(),
            port: 7777,
            max_players: 1000,
            status: ServerStatus::Auto,
            authed: false,
        }
    }

    #[test]
    fn free_id_allocation_skips_taken_bits() {
        let table = GameServerTable::new();

        assert_eq!(table.peek_free_id(), Ok(1));

        table.register_persisted(info(1, b"aa"));
        table.register_persisted(info(2, b"bb"));
        table.register_persisted(info(4, b"cc"));

        assert_eq!(table.peek_free_id(), Ok(3));
    }

    #[test]
    fn the_id_space_is_exhaustible() {
        let table = GameServerTable::new();

        for id in 1..=127 {
            table.register_persisted(info(id, b"x"));
        }

        assert_eq!(table.peek_free_id(), Err(ControlFail::NoFreeId));
    }

    #[test]
    fn the_last_id_is_reachable_through_allocation() {
        let table = GameServerTable::new();

        for id in 1..=126 {
            table.register_persisted(info(id, b"x"));
        }

        // Only the topmost id is left; the allocator must find it.
        assert_eq!(table.peek_free_id(), Ok(127));
        assert_eq!(table.auth(127, false, b"last", "x", 1, 1), Ok(127));
        assert_eq!(table.peek_free_id(), Err(ControlFail::NoFreeId));
    }

    #[test]
    fn matching_hex_id_reauthenticates() {
        let table = GameServerTable::new();
        table.register_persisted(info(5, b"secret"));

        let id = table
            .auth(5, false, b"secret", "10.0.0.1", 7777, 2000)
            .unwrap();

        assert_eq!(id, 5);
        assert!(table.is_authed(5));
        assert_eq!(table.get(5).unwrap().host, "10.0.0.1");
    }

    #[test]
    fn mismatching_hex_id_is_reserved_or_reallocated() {
        let table = GameServerTable::new();
        table.register_persisted(info(5, b"secret"));

        assert_eq!(
            table.auth(5, false, b"imposter", "x", 1, 1),
            Err(ControlFail::IdReserved)
        );

        let id = table.auth(5, true, b"imposter", "x", 1, 1).unwrap();
        assert_eq!(id, 1, "allocated the first free id instead");
    }

    #[test]
    fn fresh_id_claims_directly() {
        let table = GameServerTable::new();

        assert_eq!(table.auth(9, false, b"h", "x", 1, 1), Ok(9));
        assert!(table.is_authed(9));
    }

    #[test]
    fn reason_codes_round_trip() {
        for fail in [
            ControlFail::WrongHexId,
            ControlFail::IdReserved,
            ControlFail::NoFreeId,
            ControlFail::NotAuthed,
            ControlFail::AlreadyLoggedIn,
            ControlFail::IpBanned,
        ] {
            assert_eq!(ControlFail::from_reason_code(fail.reason_code()), Some(fail));
        }

        assert_eq!(ControlFail::from_reason_code(0x55), None);
    }
}
