use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;

use aden_login::SessionRegistry;
use aden_protocol::packets::c2s::{AuthLogin, CharacterSelect, EnterWorld};
use aden_protocol::{op, SessionKey};
use aden_world::{Location, ObjectId, PlayerStats, Vitals};

use crate::config::ServerConfig;
use crate::persist::{
    CharacterRecord, InMemoryCharacters, InMemoryFriends, InMemoryPersister,
};
use crate::server::{GameServer, GameServerDeps};
use crate::testing::TestClient;

static NEXT_CHAR_ID: AtomicI32 = AtomicI32::new(1000);
static NEXT_KEY_SEED: AtomicI32 = AtomicI32::new(0x0100_0000);

fn init_tracing() {
    use std::sync::Once;

    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .try_init();
    });
}

pub(crate) struct Harness {
    pub server: Arc<GameServer>,
    pub addr: SocketAddr,
    pub characters: Arc<InMemoryCharacters>,
    pub persister: Arc<InMemoryPersister>,
    pub friends: Arc<InMemoryFriends>,
    pub sessions: Arc<SessionRegistry>,
}

impl Harness {
    pub async fn boot() -> Self {
        let config = ServerConfig {
            // Tests drive batches explicitly through refresh_once.
            visibility_refresh_ms: 10_000,
            ..ServerConfig::default()
        };

        Self::boot_with(config).await
    }

    pub async fn boot_with(config: ServerConfig) -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let characters = InMemoryCharacters::new();
        let persister = InMemoryPersister::new();
        let friends = InMemoryFriends::new();
        let sessions = Arc::new(SessionRegistry::new());

        let server = GameServer::new(
            config,
            GameServerDeps {
                characters: characters.clone(),
                persister: persister.clone(),
                friends: friends.clone(),
                sessions: sessions.clone(),
            },
        );

        tokio::spawn(server.clone().run(listener));

        Self {
            server,
            addr,
            characters,
            persister,
            friends,
            sessions,
        }
    }

    /// Seeds one character on the account and returns its char id.
    pub fn seed_character(&self, account: &str, name: &str, x: i32, y: i32, z: i32) -> i32 {
        let char_id = NEXT_CHAR_ID.fetch_add(1, Ordering::Relaxed);

        self.characters.add_character(
            account,
            CharacterRecord {
                char_id,
                name: name.to_owned(),
                title: String::new(),
                stats: PlayerStats {
                    level: 20,
                    ..PlayerStats::default()
                },
                vitals: Vitals::default(),
                location: Location::new(x, y, z),
                items: vec![aden_world::player::OwnedItem {
                    object_id: ObjectId(char_id as u32),
                    item_id: 57,
                    count: 1000,
                    equip_slot: -1,
                    enchant_level: 0,
                }],
                access_level: 0,
            },
        );

        char_id
    }

    /// Mints and stores a distinct session key for the account.
    pub fn mint_session(&self, account: &str) -> SessionKey {
        let seed = NEXT_KEY_SEED.fetch_add(4, Ordering::Relaxed);
        let key = SessionKey::new(seed, seed + 1, seed + 2, seed + 3);

        self.sessions.store(account, key).unwrap();
        key
    }

    /// Connects a client and walks it to AUTHENTICATED.
    pub async fn authenticated_client(&self, account: &str) -> TestClient {
        let key = self.mint_session(account);
        let mut client = TestClient::connect(self.addr).await.unwrap();

        client.handshake().await.unwrap();
        client
            .send(&AuthLogin {
                account: account.to_owned(),
                keys: key,
            })
            .await
            .unwrap();

        client
            .expect_opcode(op::s2c::CHAR_SELECTION_INFO)
            .await
            .unwrap();

        client
    }

    /// Connects a client and walks it all the way into the world with
    /// the account's first character.
    pub async fn enter_world(&self, account: &str) -> TestClient {
        let mut client = self.authenticated_client(account).await;

        client.send(&CharacterSelect { slot: 0 }).await.unwrap();
        client.expect_opcode(op::s2c::CHAR_SELECTED).await.unwrap();

        client.send(&EnterWorld {}).await.unwrap();
        client.recv_until(op::s2c::QUEST_LIST).await.unwrap();

        client
    }

    pub fn object_id_of(&self, name: &str) -> ObjectId {
        self.server
            .registry()
            .get_by_player_name(name)
            .and_then(|conn| conn.object_id())
            .unwrap_or_else(|| panic!("player {name} is not spawned"))
    }
}
