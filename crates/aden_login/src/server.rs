//! The login-side control endpoint: accepts game-server links, runs the
//! key handshake, registers servers and tracks account presence.

use std::sync::Arc;

use anyhow::{bail, Context};
use parking_lot::Mutex;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::crypt::{
    scramble_modulus, ControlCipher, LoginKeyPair, MODULUS_LEN, SESSION_CONTROL_KEY_LEN,
};
use crate::framing::{read_control_packet, write_control_packet};
use crate::packets::{gs2ls, ls2gs};
use crate::session::SessionRegistry;
use crate::table::{ControlFail, GameServerTable};

/// Revision tag carried in `Init`; peers with another revision are
/// incompatible.
pub const CONTROL_PROTOCOL: i32 = 0x0106;

/// Hook into the account store for password changes. The core ships no
/// account store, so the default refuses.
pub trait PasswordBackend: Send + Sync + 'static {
    fn change_password(&self, account: &str, old: &str, new: &str) -> bool;
}

/// Refuses every change; stands in until an account store is wired up.
pub struct DenyPasswordChanges;

impl PasswordBackend for DenyPasswordChanges {
    fn change_password(&self, _account: &str, _old: &str, _new: &str) -> bool {
        false
    }
}

enum LinkCommand {
    Kick { account: String },
}

struct Link {
    server_id: u8,
    tx: flume::Sender<LinkCommand>,
}

pub struct LoginServer {
    keypair: LoginKeyPair,
    sessions: Arc<SessionRegistry>,
    table: Arc<GameServerTable>,
    password: Arc<dyn PasswordBackend>,
    links: Mutex<Vec<Link>>,
    shutdown: watch::Sender<bool>,
}

impl LoginServer {
    pub fn new(
        sessions: Arc<SessionRegistry>,
        table: Arc<GameServerTable>,
        password: Arc<dyn PasswordBackend>,
    ) -> anyhow::Result<Arc<Self>> {
        Ok(Arc::new(Self {
            keypair: LoginKeyPair::generate()?,
            sessions,
            table,
            password,
            links: Mutex::new(Vec::new()),
            shutdown: watch::channel(false).0,
        }))
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn table(&self) -> &Arc<GameServerTable> {
        &self.table
    }

    /// Demands every linked game server drop this account's client.
    pub fn kick_account(&self, account: &str) {
        for link in self.links.lock().iter() {
            let _ = link.tx.try_send(LinkCommand::Kick {
                account: account.to_owned(),
            });
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Accept loop for game-server links. Runs until shutdown.
    pub async fn run(self: Arc<Self>, listener: TcpListener) {
        let mut shutdown = self.shutdown.subscribe();

        loop {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                _ = shutdown.wait_for(|&s| s) => break,
            };

            match accepted {
                Ok((stream, addr)) => {
                    debug!(%addr, "game server link accepted");
                    let server = self.clone();

                    tokio::spawn(async move {
                        if let Err(err) = server.handle_link(stream).await {
                            warn!(%addr, err = %format!("{err:#}"), "game server link ended");
                        }
                    });
                }
                Err(err) => {
                    warn!(%err, "failed to accept game server link");
                }
            }
        }
    }

    async fn handle_link(self: Arc<Self>, stream: TcpStream) -> anyhow::Result<()> {
        let (mut read, mut write) = stream.into_split();
        let static_cipher = ControlCipher::static_key();

        // Step 1: advertise the scrambled modulus.
        let mut modulus = self.keypair.modulus_bytes();
        scramble_modulus(&mut modulus);

        write_control_packet(
            &mut write,
            &static_cipher,
            &ls2gs::Init {
                session_id: rand::random(),
                protocol: CONTROL_PROTOCOL,
                modulus,
            },
        )
        .await?;

        // Step 2: receive the link key, RSA-wrapped.
        let mut frame = read_control_packet(&mut read, &static_cipher).await?;
        let blowfish: gs2ls::BlowFishKey =
            frame.decode().context("expected BlowFishKey after Init")?;

        let plain = self.keypair.decrypt_raw(&blowfish.encrypted)?;
        let key = &plain[MODULUS_LEN - SESSION_CONTROL_KEY_LEN..];
        let cipher = ControlCipher::new(key)?;

        // Step 3: registration, then the long-lived message loop.
        let (tx, rx) = flume::bounded(16);
        let mut server_id: Option<u8> = None;
        let mut shutdown = self.shutdown.subscribe();

        let result = self
            .link_loop(
                &mut read,
                &mut write,
                &cipher,
                &tx,
                &rx,
                &mut server_id,
                &mut shutdown,
            )
            .await;

        if let Some(id) = server_id {
            self.table.mark_down(id);
            self.links.lock().retain(|l| l.server_id != id);
            info!(server_id = id, "game server link closed");
        }

        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn link_loop(
        &self,
        read: &mut OwnedReadHalf,
        write: &mut OwnedWriteHalf,
        cipher: &ControlCipher,
        tx: &flume::Sender<LinkCommand>,
        rx: &flume::Receiver<LinkCommand>,
        server_id: &mut Option<u8>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        loop {
            let mut frame = tokio::select! {
                frame = read_control_packet(read, cipher) => frame?,
                cmd = rx.recv_async() => {
                    if let Ok(LinkCommand::Kick { account }) = cmd {
                        write_control_packet(write, cipher, &ls2gs::KickPlayer { account }).await?;
                    }
                    continue;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return Ok(());
                    }
                    continue;
                }
            };

            match frame.opcode {
                gs2ls::GAME_SERVER_AUTH => {
                    let auth: gs2ls::GameServerAuth = frame.decode()?;

                    match self.table.auth(
                        auth.desired_id,
                        auth.accept_alternate != 0,
                        &auth.hex_id,
                        &auth.host,
                        auth.port,
                        auth.max_players,
                    ) {
                        Ok(id) => {
                            *server_id = Some(id);
                            self.links.lock().push(Link {
                                server_id: id,
                                tx: tx.clone(),
                            });

                            info!(server_id = id, host = %auth.host, "game server registered");
                            write_control_packet(write, cipher, &ls2gs::AuthResponse { server_id: id })
                                .await?;
                        }
                        Err(fail) => {
                            write_control_packet(
                                write,
                                cipher,
                                &ls2gs::Fail {
                                    reason: fail.reason_code(),
                                },
                            )
                            .await?;
                            bail!("registration refused: {fail}");
                        }
                    }
                }
                gs2ls::REQUEST_ID => match self.table.peek_free_id() {
                    Ok(id) => {
                        write_control_packet(write, cipher, &ls2gs::IdGranted { server_id: id })
                            .await?;
                    }
                    Err(fail) => {
                        write_control_packet(
                            write,
                            cipher,
                            &ls2gs::Fail {
                                reason: fail.reason_code(),
                            },
                        )
                        .await?;
                    }
                },
                gs2ls::PLAYER_IN_GAME => {
                    self.require_authed(*server_id)?;
                    let pkt: gs2ls::PlayerInGame = frame.decode()?;

                    for account in pkt.accounts {
                        self.sessions.mark_in_game(&account);
                    }
                }
                gs2ls::PLAYER_LOGOUT => {
                    self.require_authed(*server_id)?;
                    let pkt: gs2ls::PlayerLogout = frame.decode()?;
                    self.sessions.mark_logout(&pkt.account);
                }
                gs2ls::CHANGE_PASSWORD => {
                    self.require_authed(*server_id)?;
                    let pkt: gs2ls::ChangePassword = frame.decode()?;

                    let ok = self.password.change_password(
                        &pkt.account,
                        &pkt.old_password,
                        &pkt.new_password,
                    );

                    write_control_packet(
                        write,
                        cipher,
                        &ls2gs::ChangePasswordResult {
                            account: pkt.account,
                            ok: u8::from(ok),
                        },
                    )
                    .await?;
                }
                opcode => {
                    warn!(opcode, "unknown control opcode from game server");
                }
            }
        }
    }

    fn require_authed(&self, server_id: Option<u8>) -> anyhow::Result<()> {
        match server_id {
            Some(id) if self.table.is_authed(id) => Ok(()),
            _ => bail!("{}", ControlFail::NotAuthed),
        }
    }
}
