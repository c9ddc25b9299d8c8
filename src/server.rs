//! The game server composition root: one instance owns every singleton
//! (world, visibility manager, client registry, party registry, router,
//! buffer pool) with named dependencies injected at construction, and
//! ties their lifecycles to `run`/`shutdown`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::net::TcpListener;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use aden_login::client::ControlEvent;
use aden_login::{LoginClient, SessionRegistry};
use aden_network::{
    establish, BufferPool, ClientHandle, ClientRegistry, ClientSession, NetSettings, PacketClass,
};
use aden_protocol::packets::s2c::DeleteObject;
use aden_world::object::PLAYER_ID_FIRST;
use aden_world::{LodLevel, ObjectId, Player, VisibilityManager, World};

use crate::config::ServerConfig;
use crate::dispatch::{dispatch, PostAction, SessionCtx};
use crate::handlers::party::remove_and_notify;
use crate::party::PartyRegistry;
use crate::persist::{CharacterRepository, FriendStore, PlayerPersister};
use crate::router::BroadcastRouter;

/// External collaborators, named. No other constructor shape exists.
pub struct GameServerDeps {
    pub characters: Arc<dyn CharacterRepository>,
    pub persister: Arc<dyn PlayerPersister>,
    pub friends: Arc<dyn FriendStore>,
    pub sessions: Arc<SessionRegistry>,
}

pub struct GameServer {
    config: ServerConfig,
    world: Arc<World>,
    visibility: Arc<VisibilityManager>,
    registry: Arc<ClientRegistry>,
    parties: Arc<PartyRegistry>,
    router: Arc<BroadcastRouter>,
    pool: Arc<BufferPool>,

    characters: Arc<dyn CharacterRepository>,
    persister: Arc<dyn PlayerPersister>,
    friends: Arc<dyn FriendStore>,
    sessions: Arc<SessionRegistry>,
    login_link: Mutex<Option<Arc<LoginClient>>>,

    duels: Mutex<FxHashMap<u32, (ObjectId, ObjectId)>>,
    next_duel_id: AtomicU32,
    next_player_oid: AtomicU32,

    shutdown: watch::Sender<bool>,
    conn_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl GameServer {
    pub fn new(config: ServerConfig, deps: GameServerDeps) -> Arc<Self> {
        let world = Arc::new(World::new());
        let visibility = Arc::new(VisibilityManager::new(
            world.clone(),
            config.visibility_refresh(),
        ));
        let registry = Arc::new(ClientRegistry::new());
        let router = Arc::new(BroadcastRouter::new(
            registry.clone(),
            world.clone(),
            visibility.clone(),
        ));
        let pool = Arc::new(BufferPool::new(
            config.pool_payload_cap,
            config.pool_max_buffers,
        ));

        Arc::new(Self {
            config,
            world,
            visibility,
            registry,
            parties: Arc::new(PartyRegistry::new()),
            router,
            pool,
            characters: deps.characters,
            persister: deps.persister,
            friends: deps.friends,
            sessions: deps.sessions,
            login_link: Mutex::new(None),
            duels: Mutex::new(FxHashMap::default()),
            next_duel_id: AtomicU32::new(1),
            next_player_oid: AtomicU32::new(PLAYER_ID_FIRST),
            shutdown: watch::channel(false).0,
            conn_tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn visibility(&self) -> &Arc<VisibilityManager> {
        &self.visibility
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    pub fn parties(&self) -> &Arc<PartyRegistry> {
        &self.parties
    }

    pub fn router(&self) -> &Arc<BroadcastRouter> {
        &self.router
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn characters(&self) -> &Arc<dyn CharacterRepository> {
        &self.characters
    }

    pub fn persister(&self) -> &Arc<dyn PlayerPersister> {
        &self.persister
    }

    pub fn friends(&self) -> &Arc<dyn FriendStore> {
        &self.friends
    }

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Runtime object ids for spawning players, from the player range.
    pub fn alloc_player_object_id(&self) -> ObjectId {
        ObjectId(self.next_player_oid.fetch_add(1, Ordering::Relaxed))
    }

    pub fn start_duel(&self, a: ObjectId, b: ObjectId) -> u32 {
        let id = self.next_duel_id.fetch_add(1, Ordering::Relaxed);
        self.duels.lock().insert(id, (a, b));
        id
    }

    pub fn end_duel(&self, id: u32) -> Option<(ObjectId, ObjectId)> {
        self.duels.lock().remove(&id)
    }

    /// Wires up the control link to the login server; kicks pushed down
    /// the link close the offending client.
    pub fn attach_login_link(
        self: &Arc<Self>,
        link: Arc<LoginClient>,
        events: flume::Receiver<ControlEvent>,
    ) {
        *self.login_link.lock() = Some(link);

        let server = self.clone();
        tokio::spawn(async move {
            while let Ok(event) = events.recv_async().await {
                match event {
                    ControlEvent::Kick { account } => server.kick_account(&account),
                    ControlEvent::PasswordResult { account, ok } => {
                        debug!(%account, ok, "password change result");
                    }
                }
            }
        });
    }

    pub fn kick_account(&self, account: &str) {
        if let Some(conn) = self.registry.get_by_account(account) {
            warn!(account, conn_id = conn.conn_id(), "kicking client");
            conn.close();
        }
    }

    /// Marks the account present and forwards the fact to the login
    /// server when a link is attached.
    pub fn notify_player_online(&self, account: &str) {
        self.sessions.mark_in_game(account);

        if let Some(link) = self.login_link.lock().clone() {
            let account = account.to_owned();
            tokio::spawn(async move {
                if let Err(err) = link.player_in_game(vec![account]).await {
                    debug!(%err, "failed to report player-in-game");
                }
            });
        }
    }

    pub fn notify_player_offline(&self, account: &str) {
        self.sessions.mark_logout(account);

        if let Some(link) = self.login_link.lock().clone() {
            let account = account.to_owned();
            tokio::spawn(async move {
                if let Err(err) = link.player_logout(account).await {
                    debug!(%err, "failed to report player-logout");
                }
            });
        }
    }

    /// Removes a spawned player from every runtime index: observers are
    /// told first, then the registries forget the object. Synchronous;
    /// persistence happens at the call sites that own the async context.
    pub fn despawn_player(&self, conn: &Arc<ClientHandle>) -> Option<Arc<Player>> {
        let player = conn.unbind_player()?;

        let delete = DeleteObject {
            object_id: player.id.as_i32(),
        };

        if let Ok(body) = BroadcastRouter::encode(&delete) {
            self.router
                .broadcast_to_visible(player.id, LodLevel::All, &body, PacketClass::Gameplay);
        }

        if let Some(party_id) = player.party_id() {
            remove_and_notify(
                self,
                party_id,
                &player,
                aden_protocol::packets::s2c::sm::PLAYER_LEFT_THE_PARTY,
            );
        }

        self.registry.unregister_player(&player);
        self.visibility.unregister_player(player.id);

        if let Err(err) = self.world.remove_object(player.id) {
            debug!(object_id = player.id.0, %err, "player was not in the world");
        }

        info!(object_id = player.id.0, name = %player.name, "player despawned");
        Some(player)
    }

    /// Accept loop. Returns when shutdown is signalled.
    pub async fn run(self: Arc<Self>, listener: TcpListener) {
        let vis_task = self.visibility.spawn_refresh_task(self.shutdown.subscribe());
        let sema = Arc::new(Semaphore::new(self.config.max_clients));
        let mut shutdown = self.shutdown.subscribe();

        info!(addr = %listener.local_addr().map(|a| a.to_string()).unwrap_or_default(), "game server listening");

        loop {
            let permit = tokio::select! {
                permit = sema.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = shutdown.wait_for(|&s| s) => break,
            };

            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                _ = shutdown.wait_for(|&s| s) => break,
            };

            match accepted {
                Ok((stream, addr)) => {
                    let settings = NetSettings {
                        send_queue_capacity: self.config.send_queue_capacity,
                        max_inbound_body: self.config.max_inbound_body,
                    };

                    let (_handle, session, writer) =
                        establish(stream, addr, settings, self.pool.clone());

                    let server = self.clone();
                    let task = tokio::spawn(async move {
                        server.drive_connection(session, writer).await;
                        drop(permit);
                    });

                    let mut tasks = self.conn_tasks.lock();
                    tasks.retain(|t| !t.is_finished());
                    tasks.push(task);
                }
                Err(err) => {
                    error!(%err, "failed to accept client connection");
                }
            }
        }

        let _ = vis_task.await;
        debug!("accept loop stopped");
    }

    /// One task per connection: read, dispatch, clean up, then wait for
    /// the writer to drain.
    async fn drive_connection(self: Arc<Self>, mut session: ClientSession, writer: JoinHandle<()>) {
        let conn = session.handle().clone();
        let mut sctx = SessionCtx::default();
        let mut shutdown = self.shutdown.subscribe();

        loop {
            let frame = tokio::select! {
                frame = session.next_frame() => frame,
                _ = shutdown.wait_for(|&s| s) => Ok(None),
            };

            match frame {
                Ok(Some(frame)) => {
                    match dispatch(&self, &conn, &mut sctx, frame).await {
                        PostAction::KeepOpen => {}
                        PostAction::Close => break,
                        PostAction::EnableEncryption(key) => session.enable_encryption(key),
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    // Framing or cipher fault: no reply, just drop.
                    warn!(conn_id = conn.conn_id(), err = %format!("{err:#}"), "protocol fault");
                    break;
                }
            }
        }

        self.cleanup_connection(&conn).await;
        conn.close();
        let _ = writer.await;

        debug!(conn_id = conn.conn_id(), "connection task finished");
    }

    /// Removes a dead client from every index and persists whatever was
    /// still bound. Runs exactly once per connection, whatever the exit
    /// path was.
    async fn cleanup_connection(&self, conn: &Arc<ClientHandle>) {
        if let Some(player) = self.despawn_player(conn) {
            if let Err(err) = self.persister.save_player(&player).await {
                warn!(object_id = player.id.0, %err, "failed to persist player at disconnect");
            }
        }

        if let Some(account) = conn.account() {
            // A displaced connection must not clear the presence of the
            // session that displaced it.
            let owns = self
                .registry
                .get_by_account(&account)
                .is_some_and(|current| current.conn_id() == conn.conn_id());

            if owns {
                self.notify_player_offline(&account);
            }

            self.registry.unregister_account(&account, conn);
        }
    }

    /// Graceful shutdown: stop accepting, close every connection, wait
    /// for each task (readers, then writers draining their queues), then
    /// drop the world state.
    pub async fn shutdown(&self) {
        info!("game server shutting down");
        self.shutdown.send_replace(true);

        for conn in self.registry.drain() {
            conn.close();
        }

        let tasks = std::mem::take(&mut *self.conn_tasks.lock());
        for task in tasks {
            let _ = task.await;
        }

        self.world.clear();
        self.visibility.clear();

        info!("game server stopped");
    }
}
