//! The game-side control endpoint: dials the login server, runs the key
//! handshake, registers, then relays presence updates and kicks.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::crypt::{encrypt_raw, unscramble_modulus, ControlCipher, SESSION_CONTROL_KEY_LEN};
use crate::framing::{read_control_packet, write_control_packet};
use crate::packets::{gs2ls, ls2gs};
use crate::table::ControlFail;

/// How this game server introduces itself during registration.
#[derive(Clone, Debug)]
pub struct LoginClientConfig {
    pub desired_id: u8,
    pub accept_alternate: bool,
    /// Shared secret proving identity across reconnects.
    pub hex_id: Vec<u8>,
    pub host: String,
    pub port: u16,
    pub max_players: i32,
}

impl Default for LoginClientConfig {
    fn default() -> Self {
        Self {
            desired_id: 1,
            accept_alternate: true,
            hex_id: b"aden-gs".to_vec(),
            host: "127.0.0.1".into(),
            port: 7777,
            max_players: 1000,
        }
    }
}

/// Commands the login server pushes down the link.
#[derive(Clone, Debug)]
pub enum ControlEvent {
    Kick { account: String },
    PasswordResult { account: String, ok: bool },
}

pub struct LoginClient {
    server_id: u8,
    cipher: Arc<ControlCipher>,
    write: Mutex<OwnedWriteHalf>,
    reader: JoinHandle<()>,
}

impl LoginClient {
    /// Connects and registers. Returns the client plus the stream of
    /// server-pushed events.
    pub async fn connect(
        addr: SocketAddr,
        config: LoginClientConfig,
    ) -> anyhow::Result<(Self, flume::Receiver<ControlEvent>)> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("connecting to login server at {addr}"))?;

        let (mut read, mut write) = stream.into_split();
        let static_cipher = ControlCipher::static_key();

        let mut frame = read_control_packet(&mut read, &static_cipher).await?;
        let init: ls2gs::Init = frame.decode().context("expected Init")?;

        let mut modulus = init.modulus;
        unscramble_modulus(&mut modulus);

        // Mint the link key and hand it over under the peer's RSA key.
        let key: [u8; SESSION_CONTROL_KEY_LEN] = rand::random();
        let encrypted = encrypt_raw(&modulus, &key)?;

        write_control_packet(
            &mut write,
            &static_cipher,
            &gs2ls::BlowFishKey {
                encrypted: encrypted.to_vec(),
            },
        )
        .await?;

        let cipher = Arc::new(ControlCipher::new(&key)?);

        write_control_packet(
            &mut write,
            &cipher,
            &gs2ls::GameServerAuth {
                desired_id: config.desired_id,
                accept_alternate: u8::from(config.accept_alternate),
                host: config.host.clone(),
                port: config.port,
                max_players: config.max_players,
                hex_id: config.hex_id.clone(),
            },
        )
        .await?;

        let mut frame = read_control_packet(&mut read, &cipher).await?;

        let server_id = match frame.opcode {
            ls2gs::AUTH_RESPONSE => frame.decode::<ls2gs::AuthResponse>()?.server_id,
            ls2gs::FAIL => {
                let fail: ls2gs::Fail = frame.decode()?;

                match ControlFail::from_reason_code(fail.reason) {
                    Some(reason) => bail!("login server refused registration: {reason}"),
                    None => bail!("login server refused registration (code {})", fail.reason),
                }
            }
            opcode => bail!("unexpected control opcode {opcode:#04x} during registration"),
        };

        info!(server_id, "registered with the login server");

        let (events_tx, events_rx) = flume::bounded(64);
        let reader_cipher = cipher.clone();

        let reader = tokio::spawn(async move {
            loop {
                let mut frame = match read_control_packet(&mut read, &reader_cipher).await {
                    Ok(frame) => frame,
                    Err(err) => {
                        debug!(%err, "login control link closed");
                        break;
                    }
                };

                let event = match frame.opcode {
                    ls2gs::KICK_PLAYER => match frame.decode::<ls2gs::KickPlayer>() {
                        Ok(pkt) => ControlEvent::Kick {
                            account: pkt.account,
                        },
                        Err(err) => {
                            warn!(%err, "malformed KickPlayer");
                            continue;
                        }
                    },
                    ls2gs::CHANGE_PASSWORD_RESULT => {
                        match frame.decode::<ls2gs::ChangePasswordResult>() {
                            Ok(pkt) => ControlEvent::PasswordResult {
                                account: pkt.account,
                                ok: pkt.ok != 0,
                            },
                            Err(err) => {
                                warn!(%err, "malformed ChangePasswordResult");
                                continue;
                            }
                        }
                    }
                    opcode => {
                        warn!(opcode, "unknown control opcode from login server");
                        continue;
                    }
                };

                if events_tx.send_async(event).await.is_err() {
                    break;
                }
            }
        });

        Ok((
            Self {
                server_id,
                cipher,
                write: Mutex::new(write),
                reader,
            },
            events_rx,
        ))
    }

    pub fn server_id(&self) -> u8 {
        self.server_id
    }

    pub async fn player_in_game(&self, accounts: Vec<String>) -> anyhow::Result<()> {
        let mut write = self.write.lock().await;
        write_control_packet(&mut *write, &self.cipher, &gs2ls::PlayerInGame { accounts }).await
    }

    pub async fn player_logout(&self, account: impl Into<String>) -> anyhow::Result<()> {
        let mut write = self.write.lock().await;
        write_control_packet(
            &mut *write,
            &self.cipher,
            &gs2ls::PlayerLogout {
                account: account.into(),
            },
        )
        .await
    }

    pub async fn change_password(
        &self,
        account: impl Into<String>,
        old_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> anyhow::Result<()> {
        let mut write = self.write.lock().await;
        write_control_packet(
            &mut *write,
            &self.cipher,
            &gs2ls::ChangePassword {
                account: account.into(),
                old_password: old_password.into(),
                new_password: new_password.into(),
            },
        )
        .await
    }
}

impl Drop for LoginClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::server::{DenyPasswordChanges, LoginServer};
    use crate::session::SessionRegistry;
    use crate::table::GameServerTable;

    async fn spawn_login_server() -> (Arc<LoginServer>, SocketAddr) {
        let sessions = Arc::new(SessionRegistry::new());
        let table = Arc::new(GameServerTable::new());
        let server =
            LoginServer::new(sessions, table, Arc::new(DenyPasswordChanges)).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(server.clone().run(listener));

        (server, addr)
    }

    #[tokio::test]
    async fn handshake_registers_the_game_server() {
        let (server, addr) = spawn_login_server().await;

        let (client, _events) = LoginClient::connect(addr, LoginClientConfig::default())
            .await
            .unwrap();

        assert_eq!(client.server_id(), 1);
        assert!(server.table().is_authed(1));

        server.shutdown();
    }

    #[tokio::test]
    async fn presence_updates_reach_the_session_registry() {
        let (server, addr) = spawn_login_server().await;

        let (client, _events) = LoginClient::connect(addr, LoginClientConfig::default())
            .await
            .unwrap();

        client.player_in_game(vec!["acct1".into()]).await.unwrap();

        // The update crosses the link asynchronously.
        tokio::time::timeout(Duration::from_secs(2), async {
            while !server.sessions().is_in_game("acct1") {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("PlayerInGame never arrived");

        client.player_logout("acct1").await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), async {
            while server.sessions().is_in_game("acct1") {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("PlayerLogout never arrived");

        server.shutdown();
    }

    #[tokio::test]
    async fn kicks_travel_down_the_link() {
        let (server, addr) = spawn_login_server().await;

        let (_client, events) = LoginClient::connect(addr, LoginClientConfig::default())
            .await
            .unwrap();

        server.kick_account("cheater");

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv_async())
            .await
            .expect("kick never arrived")
            .unwrap();

        match event {
            ControlEvent::Kick { account } => assert_eq!(account, "cheater"),
            other => panic!("unexpected event {other:?}"),
        }

        server.shutdown();
    }

    #[tokio::test]
    async fn second_server_gets_the_next_free_id() {
        let (server, addr) = spawn_login_server().await;

        let (first, _e1) = LoginClient::connect(addr, LoginClientConfig::default())
            .await
            .unwrap();

        let second_cfg = LoginClientConfig {
            hex_id: b"other-gs".to_vec(),
            ..LoginClientConfig::default()
        };

        let (second, _e2) = LoginClient::connect(addr, second_cfg).await.unwrap();

        assert_eq!(first.server_id(), 1);
        assert_eq!(second.server_id(), 2);

        server.shutdown();
    }
}
