//! The packet dispatcher: opcode resolution, state gating, handler
//! invocation with panic containment, and reply flushing.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;

use bytes::Bytes;
use tracing::{debug, error, warn};

use aden_network::{ClientHandle, ConnState, PacketClass};
use aden_protocol::{Decode, Encode, Packet, PacketFrame, EXT_C2S_PREFIX};
use aden_world::Player;

use crate::handlers;
use crate::persist::{CharacterRecord, FriendSets};
use crate::server::GameServer;

/// Boxed handler future; handlers borrow their context for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Which connection states admit an opcode.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct StateMask(u8);

impl StateMask {
    pub const CONNECTED: Self = Self(1 << ConnState::Connected as u8);
    pub const AUTHENTICATED: Self = Self(1 << ConnState::Authenticated as u8);
    pub const ENTERING: Self = Self(1 << ConnState::Entering as u8);
    pub const IN_GAME: Self = Self(1 << ConnState::InGame as u8);

    /// Everything from AUTHENTICATED on.
    pub const AUTHED_UP: Self =
        Self(Self::AUTHENTICATED.0 | Self::ENTERING.0 | Self::IN_GAME.0);

    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn allows(self, state: ConnState) -> bool {
        state != ConnState::Disconnected && self.0 & (1 << state as u8) != 0
    }
}

/// What the connection loop does after a packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostAction {
    KeepOpen,
    Close,
    /// Keep open, and arm the inbound session cipher with this key
    /// before reading the next packet.
    EnableEncryption([u8; 8]),
}

/// Per-connection dispatch state that outlives single packets but not
/// the connection: the character list cached at AuthLogin, the pick made
/// at CharacterSelect, and the friend sets loaded at EnterWorld.
#[derive(Default)]
pub struct SessionCtx {
    pub char_list: Vec<CharacterRecord>,
    pub selected: Option<Arc<Player>>,
    pub friend_sets: Option<FriendSets>,
}

/// Synchronous replies accumulated by a handler, flushed by the
/// dispatcher in order after the handler returns.
#[derive(Default)]
pub struct ReplyBuf {
    frames: Vec<(Bytes, PacketClass)>,
}

impl ReplyBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a must-arrive reply (login, spawn, death).
    pub fn put<P>(&mut self, packet: &P) -> anyhow::Result<()>
    where
        P: Packet + Encode,
    {
        self.put_class(packet, PacketClass::Critical)
    }

    /// Appends a best-effort reply.
    pub fn put_gameplay<P>(&mut self, packet: &P) -> anyhow::Result<()>
    where
        P: Packet + Encode,
    {
        self.put_class(packet, PacketClass::Gameplay)
    }

    fn put_class<P>(&mut self, packet: &P, class: PacketClass) -> anyhow::Result<()>
    where
        P: Packet + Encode,
    {
        let mut buf = Vec::new();
        packet.encode_with_id(&mut buf)?;
        self.frames.push((Bytes::from(buf), class));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn drain(&mut self) -> impl Iterator<Item = (Bytes, PacketClass)> + '_ {
        self.frames.drain(..)
    }
}

/// Everything a handler sees. Passed by value; the boxed future owns it
/// for the duration of the call.
pub struct DispatchCtx<'a> {
    pub server: &'a Arc<GameServer>,
    pub conn: &'a Arc<ClientHandle>,
    pub session: &'a mut SessionCtx,
    /// Decrypted body after the opcode (and subopcode) bytes.
    pub body: &'a [u8],
    pub reply: &'a mut ReplyBuf,
}

impl DispatchCtx<'_> {
    /// Decodes the packet body as `T`. Trailing checksum and padding are
    /// fine; missing fields are a protocol fault.
    pub fn decode<T>(&self) -> anyhow::Result<T>
    where
        T: for<'r> Decode<'r>,
    {
        let mut r = self.body;
        T::decode(&mut r)
    }

    /// The spawned player bound to this connection.
    pub fn player(&self) -> anyhow::Result<Arc<Player>> {
        self.conn
            .player()
            .ok_or_else(|| anyhow::anyhow!("no player bound to connection"))
    }
}

pub type HandlerResult = anyhow::Result<PostAction>;
pub type HandlerFn = for<'a> fn(DispatchCtx<'a>) -> BoxFuture<'a, HandlerResult>;

/// One row of the dispatch table.
pub struct HandlerEntry {
    pub name: &'static str,
    pub states: StateMask,
    pub handle: HandlerFn,
}

/// Runs one inbound frame through the table.
pub async fn dispatch(
    server: &Arc<GameServer>,
    conn: &Arc<ClientHandle>,
    session: &mut SessionCtx,
    mut frame: PacketFrame,
) -> PostAction {
    let entry = if frame.opcode == EXT_C2S_PREFIX {
        let sub = match frame.read_ext_subop() {
            Ok(sub) => sub,
            Err(_) => {
                warn!(conn_id = conn.conn_id(), "extended packet without subopcode");
                return PostAction::Close;
            }
        };

        match handlers::ext_entry(sub) {
            Some(entry) => entry,
            None => {
                warn!(
                    conn_id = conn.conn_id(),
                    subop = sub,
                    "unknown extended opcode, discarding"
                );
                return PostAction::KeepOpen;
            }
        }
    } else {
        match handlers::primary_entry(frame.opcode) {
            Some(entry) => entry,
            None => {
                warn!(
                    conn_id = conn.conn_id(),
                    opcode = frame.opcode,
                    "unknown opcode, discarding"
                );
                return PostAction::KeepOpen;
            }
        }
    };

    // State gating happens before the handler runs; a gated packet is
    // discarded without touching connection state.
    let state = conn.state();

    if !entry.states.allows(state) {
        warn!(
            conn_id = conn.conn_id(),
            handler = entry.name,
            ?state,
            "opcode not legal in this state, discarding"
        );
        return PostAction::KeepOpen;
    }

    let mut reply = ReplyBuf::new();

    let outcome = {
        let ctx = DispatchCtx {
            server,
            conn,
            session,
            body: &frame.body,
            reply: &mut reply,
        };

        run_caught(entry, ctx).await
    };

    let action = match outcome {
        Ok(Ok(action)) => action,
        Ok(Err(err)) => {
            // Malformed body or handler-level protocol fault.
            warn!(
                conn_id = conn.conn_id(),
                handler = entry.name,
                err = %format!("{err:#}"),
                "handler failed, closing connection"
            );
            PostAction::Close
        }
        Err(_panic) => {
            error!(
                conn_id = conn.conn_id(),
                account = conn.account().as_deref().unwrap_or("-"),
                handler = entry.name,
                "handler panicked, closing connection"
            );
            PostAction::Close
        }
    };

    // Replies flush in handler order on the same queue as broadcasts.
    for (body, class) in reply.drain() {
        if let Err(err) = conn.send(body, class) {
            debug!(conn_id = conn.conn_id(), %err, "failed to flush reply");
        }
    }

    action
}

/// Polls the handler future inside `catch_unwind` so a panicking handler
/// takes down its connection, not the server.
async fn run_caught(
    entry: &'static HandlerEntry,
    ctx: DispatchCtx<'_>,
) -> Result<HandlerResult, Box<dyn std::any::Any + Send>> {
    let mut fut = (entry.handle)(ctx);

    std::future::poll_fn(move |task| {
        match std::panic::catch_unwind(AssertUnwindSafe(|| fut.as_mut().poll(task))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(result)) => Poll::Ready(Ok(result)),
            Err(panic) => Poll::Ready(Err(panic)),
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_mask_matches_the_lifecycle_table() {
        let auth_only = StateMask::AUTHENTICATED;

        assert!(auth_only.allows(ConnState::Authenticated));
        assert!(!auth_only.allows(ConnState::Connected));
        assert!(!auth_only.allows(ConnState::InGame));

        let combined = StateMask::CONNECTED.or(StateMask::AUTHENTICATED);
        assert!(combined.allows(ConnState::Connected));
        assert!(combined.allows(ConnState::Authenticated));

        assert!(StateMask::AUTHED_UP.allows(ConnState::Entering));
        assert!(StateMask::AUTHED_UP.allows(ConnState::InGame));
        assert!(!StateMask::AUTHED_UP.allows(ConnState::Connected));
    }

    #[test]
    fn nothing_is_legal_after_disconnect() {
        for mask in [
            StateMask::CONNECTED,
            StateMask::AUTHED_UP,
            StateMask::IN_GAME,
        ] {
            assert!(!mask.allows(ConnState::Disconnected));
        }
    }
}
