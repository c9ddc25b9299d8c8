//! The serialized write path: one bounded queue and one writer task per
//! connection. The writer owns the outgoing cipher, so ciphertext order
//! is exactly queue order.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use aden_protocol::codec::{frame_packet, frame_packet_static, GameCipher, HEADER_SIZE};

use crate::pool::BufferPool;

/// Delivery policy when a recipient's queue is full. The broadcast
/// router picks the class per call; the queue itself has no opinion.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PacketClass {
    /// Best effort: dropped when the queue is full.
    Gameplay,
    /// Must arrive: a full queue closes the connection instead.
    Critical,
}

/// One unit of work for the writer task.
pub enum OutboundPacket {
    /// A plaintext packet body, framed with the session cipher.
    Data { body: Bytes, class: PacketClass },
    /// The key-init packet: written through the static-key path, after
    /// which the session cipher activates with `key`.
    KeyInit { body: Bytes, key: [u8; 8] },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// Queue full on a best-effort packet; the packet was dropped.
    #[error("send queue full, packet dropped")]
    Dropped,
    /// The connection is closed or closing.
    #[error("connection closed")]
    Closed,
}

/// Drains the queue into the socket until the connection dies. On a kill
/// signal, the backlog already in the queue is flushed (bounded by the
/// queue capacity) before the task exits.
pub(crate) async fn write_loop(
    conn_id: u64,
    mut stream: OwnedWriteHalf,
    rx: flume::Receiver<OutboundPacket>,
    pool: Arc<BufferPool>,
    mut kill: watch::Receiver<bool>,
) {
    let mut cipher: Option<GameCipher> = None;

    loop {
        let packet = tokio::select! {
            packet = rx.recv_async() => match packet {
                Ok(packet) => packet,
                Err(_) => break,
            },
            _ = kill.changed() => {
                if !*kill.borrow() {
                    continue;
                }

                // Graceful close: flush what was already queued.
                while let Ok(packet) = rx.try_recv() {
                    if write_one(conn_id, &mut stream, &pool, &mut cipher, packet)
                        .await
                        .is_err()
                    {
                        break;
                    }
                }

                break;
            }
        };

        if write_one(conn_id, &mut stream, &pool, &mut cipher, packet)
            .await
            .is_err()
        {
            break;
        }
    }

    let _ = stream.shutdown().await;
    trace!(conn_id, "writer task stopped");
}

async fn write_one(
    conn_id: u64,
    stream: &mut OwnedWriteHalf,
    pool: &Arc<BufferPool>,
    cipher: &mut Option<GameCipher>,
    packet: OutboundPacket,
) -> std::io::Result<()> {
    let (body, key) = match packet {
        OutboundPacket::Data { body, .. } => (body, None),
        OutboundPacket::KeyInit { body, key } => (body, Some(key)),
    };

    // The lease holds the buffer out of the pool until the write below
    // completes.
    let mut lease = pool.lease(body.len());
    lease[HEADER_SIZE..HEADER_SIZE + body.len()].copy_from_slice(&body);

    let framed = if let Some(key) = key {
        let framed = frame_packet_static(&mut lease, body.len());
        *cipher = Some(GameCipher::new(key));
        framed
    } else if let Some(cipher) = cipher.as_mut() {
        frame_packet(&mut lease, body.len(), cipher)
    } else {
        // Nothing but the key-init packet may precede the cipher.
        warn!(conn_id, "dropping outbound packet sent before key init");
        return Ok(());
    };

    let wire_len = match framed {
        Ok(len) => len,
        Err(err) => {
            warn!(conn_id, %err, "failed to frame outbound packet");
            return Ok(());
        }
    };

    match stream.write_all(&lease[..wire_len]).await {
        Ok(()) => Ok(()),
        Err(err) => {
            debug!(conn_id, %err, "error writing to client socket");
            Err(err)
        }
    }
}
