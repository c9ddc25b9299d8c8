//! The two halves of a client connection: the shared [`ClientHandle`]
//! other subsystems talk to, and the task-owned [`ClientSession`] that
//! reads and decodes inbound frames.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, trace};

use aden_protocol::{Encode, Packet, PacketDecoder, PacketFrame, SessionKey};
use aden_world::{ObjectId, Player};

use crate::outbound::{write_loop, OutboundPacket, PacketClass, SendError};
use crate::pool::BufferPool;
use crate::state::ConnState;

const READ_BUF_SIZE: usize = 4096;

/// Tunables for per-connection plumbing.
#[derive(Copy, Clone, Debug)]
pub struct NetSettings {
    /// Bound of the per-client outbound queue.
    pub send_queue_capacity: usize,
    /// Largest accepted inbound packet body.
    pub max_inbound_body: usize,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            send_queue_capacity: 128,
            max_inbound_body: 8192,
        }
    }
}

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// The shared side of a connection. Everything here may be touched from
/// any task; writes to the socket funnel through the bounded queue.
pub struct ClientHandle {
    conn_id: u64,
    addr: SocketAddr,
    state: AtomicU8,
    account: Mutex<Option<String>>,
    session_key: Mutex<Option<SessionKey>>,
    player: Mutex<Option<Arc<Player>>>,
    sender: flume::Sender<OutboundPacket>,
    kill: watch::Sender<bool>,
}

impl ClientHandle {
    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn state(&self) -> ConnState {
        ConnState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: ConnState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn account(&self) -> Option<String> {
        self.account.lock().clone()
    }

    pub fn set_account(&self, account: impl Into<String>) {
        *self.account.lock() = Some(account.into());
    }

    pub fn session_key(&self) -> Option<SessionKey> {
        *self.session_key.lock()
    }

    pub fn set_session_key(&self, key: SessionKey) {
        *self.session_key.lock() = Some(key);
    }

    pub fn player(&self) -> Option<Arc<Player>> {
        self.player.lock().clone()
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.player.lock().as_ref().map(|p| p.id)
    }

    pub fn bind_player(&self, player: Arc<Player>) {
        *self.player.lock() = Some(player);
    }

    pub fn unbind_player(&self) -> Option<Arc<Player>> {
        self.player.lock().take()
    }

    /// Enqueues a plaintext packet body for the writer task.
    ///
    /// Queue-full handling follows the packet class: gameplay traffic is
    /// dropped, critical traffic closes the connection.
    pub fn send(&self, body: Bytes, class: PacketClass) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }

        match self.sender.try_send(OutboundPacket::Data { body, class }) {
            Ok(()) => Ok(()),
            Err(flume::TrySendError::Full(_)) => match class {
                PacketClass::Gameplay => Err(SendError::Dropped),
                PacketClass::Critical => {
                    error!(
                        conn_id = self.conn_id,
                        "send queue saturated on a critical packet; closing"
                    );
                    self.close();
                    Err(SendError::Closed)
                }
            },
            Err(flume::TrySendError::Disconnected(_)) => Err(SendError::Closed),
        }
    }

    /// Encodes `packet` and enqueues it.
    pub fn send_packet<P>(&self, packet: &P, class: PacketClass) -> Result<(), SendError>
    where
        P: Packet + Encode,
    {
        let mut buf = Vec::new();

        if let Err(err) = packet.encode_with_id(&mut buf) {
            error!(conn_id = self.conn_id, %err, "failed to encode '{}'", P::NAME);
            return Err(SendError::Dropped);
        }

        self.send(Bytes::from(buf), class)
    }

    /// Enqueues the key-init packet and arms the outgoing session cipher
    /// behind it.
    pub fn send_key_init<P>(&self, packet: &P, key: [u8; 8]) -> Result<(), SendError>
    where
        P: Packet + Encode,
    {
        let mut buf = Vec::new();

        if let Err(err) = packet.encode_with_id(&mut buf) {
            error!(conn_id = self.conn_id, %err, "failed to encode '{}'", P::NAME);
            return Err(SendError::Dropped);
        }

        self.sender
            .try_send(OutboundPacket::KeyInit {
                body: Bytes::from(buf),
                key,
            })
            .map_err(|_| SendError::Closed)
    }

    /// Signals every task bound to this connection to stop. Idempotent.
    pub fn close(&self) {
        self.set_state(ConnState::Disconnected);
        self.kill.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.kill.borrow()
    }

    /// A receiver that resolves once [`close`](Self::close) runs.
    pub fn kill_signal(&self) -> watch::Receiver<bool> {
        self.kill.subscribe()
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("conn_id", &self.conn_id)
            .field("addr", &self.addr)
            .field("state", &self.state())
            .field("account", &*self.account.lock())
            .finish()
    }
}

/// The reading half, owned by the connection's dispatch task.
pub struct ClientSession {
    handle: Arc<ClientHandle>,
    reader: OwnedReadHalf,
    decoder: PacketDecoder,
    kill: watch::Receiver<bool>,
}

impl ClientSession {
    pub fn handle(&self) -> &Arc<ClientHandle> {
        &self.handle
    }

    /// Arms the inbound session cipher; effective from the next frame.
    pub fn enable_encryption(&mut self, dynamic: [u8; 8]) {
        self.decoder.enable_encryption(dynamic);
    }

    /// Reads the next whole frame. `Ok(None)` means the peer closed or
    /// the connection was killed; errors are protocol faults and the
    /// caller must drop the connection without replying.
    pub async fn next_frame(&mut self) -> anyhow::Result<Option<PacketFrame>> {
        loop {
            if let Some(frame) = self.decoder.try_next_packet()? {
                return Ok(Some(frame));
            }

            self.decoder.reserve(READ_BUF_SIZE);
            let mut buf = self.decoder.take_capacity();

            let read = tokio::select! {
                read = self.reader.read_buf(&mut buf) => read?,
                _ = self.kill.wait_for(|&killed| killed) => return Ok(None),
            };

            if read == 0 {
                return Ok(None);
            }

            self.decoder.queue_bytes(buf);
        }
    }
}

/// Splits a fresh TCP stream into the shared handle, the reader session
/// and a spawned writer task.
pub fn establish(
    stream: TcpStream,
    addr: SocketAddr,
    settings: NetSettings,
    pool: Arc<BufferPool>,
) -> (Arc<ClientHandle>, ClientSession, JoinHandle<()>) {
    if let Err(err) = stream.set_nodelay(true) {
        error!("failed to set TCP_NODELAY: {err}");
    }

    let conn_id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);
    let (read_half, write_half) = stream.into_split();

    let (sender, receiver) = flume::bounded(settings.send_queue_capacity);
    let (kill_tx, kill_rx) = watch::channel(false);

    let handle = Arc::new(ClientHandle {
        conn_id,
        addr,
        state: AtomicU8::new(ConnState::Connected as u8),
        account: Mutex::new(None),
        session_key: Mutex::new(None),
        player: Mutex::new(None),
        sender,
        kill: kill_tx,
    });

    let writer = tokio::spawn(write_loop(
        conn_id,
        write_half,
        receiver,
        pool,
        kill_rx.clone(),
    ));

    let session = ClientSession {
        handle: handle.clone(),
        reader: read_half,
        decoder: PacketDecoder::new(settings.max_inbound_body),
        kill: kill_rx,
    };

    trace!(conn_id, %addr, "connection established");

    (handle, session, writer)
}

/// Builds a handle that is not backed by a socket. The paired receiver
/// exposes everything enqueued on the handle; used by unit tests and by
/// the login-side kick path before a player exists.
pub fn detached_handle(
    addr: SocketAddr,
    queue_capacity: usize,
) -> (Arc<ClientHandle>, flume::Receiver<OutboundPacket>) {
    let conn_id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);
    let (sender, receiver) = flume::bounded(queue_capacity);
    let (kill_tx, _kill_rx) = watch::channel(false);

    let handle = Arc::new(ClientHandle {
        conn_id,
        addr,
        state: AtomicU8::new(ConnState::Connected as u8),
        account: Mutex::new(None),
        session_key: Mutex::new(None),
        player: Mutex::new(None),
        sender,
        kill: kill_tx,
    });

    (handle, receiver)
}

/// Decodes one queued [`OutboundPacket`] body for assertions in tests.
pub fn outbound_body(packet: &OutboundPacket) -> (&Bytes, Option<PacketClass>) {
    match packet {
        OutboundPacket::Data { body, class } => (body, Some(*class)),
        OutboundPacket::KeyInit { body, .. } => (body, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:7777".parse().unwrap()
    }

    #[test]
    fn queue_full_policy_differs_by_class() {
        let (handle, _rx) = detached_handle(addr(), 2);

        handle.send(Bytes::from_static(b"\x1f"), PacketClass::Gameplay).unwrap();
        handle.send(Bytes::from_static(b"\x1f"), PacketClass::Gameplay).unwrap();

        // Full queue: gameplay drops, connection stays up.
        assert_eq!(
            handle.send(Bytes::from_static(b"\x1f"), PacketClass::Gameplay),
            Err(SendError::Dropped)
        );
        assert!(!handle.is_closed());

        // Full queue on a critical packet: the connection dies.
        assert_eq!(
            handle.send(Bytes::from_static(b"\x62"), PacketClass::Critical),
            Err(SendError::Closed)
        );
        assert!(handle.is_closed());
        assert_eq!(handle.state(), ConnState::Disconnected);
    }

    #[test]
    fn sends_after_close_are_refused() {
        let (handle, _rx) = detached_handle(addr(), 8);

        handle.close();
        assert_eq!(
            handle.send(Bytes::from_static(b"\x1f"), PacketClass::Gameplay),
            Err(SendError::Closed)
        );
    }

    #[test]
    fn close_is_observable_and_idempotent() {
        let (handle, _rx) = detached_handle(addr(), 8);
        let signal = handle.kill_signal();

        handle.close();
        handle.close();

        assert!(*signal.borrow());
        assert_eq!(handle.state(), ConnState::Disconnected);
    }
}
