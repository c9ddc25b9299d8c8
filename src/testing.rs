//! Test utilities: a client that speaks the real wire protocol over a
//! loopback socket, cipher and all. Lives in the library so integration
//! suites and downstream consumers can drive a server end to end.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use aden_protocol::codec::{
    decrypt_static, frame_packet, frame_packet_plain, verify_checksum, GameCipher, HEADER_SIZE,
    PAD,
};
use aden_protocol::packets::c2s::ProtocolVersion;
use aden_protocol::packets::s2c::KeyInit;
use aden_protocol::{op, Encode, Packet, PacketDecoder, PacketFrame, PROTOCOL_VERSION};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A game client talking to a live server socket.
pub struct TestClient {
    stream: TcpStream,
    decoder: PacketDecoder,
    out_cipher: Option<GameCipher>,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;

        Ok(Self {
            stream,
            decoder: PacketDecoder::default(),
            out_cipher: None,
        })
    }

    /// Sends a packet without any cipher, as the very first client
    /// packets travel.
    pub async fn send_plain<P>(&mut self, packet: &P) -> anyhow::Result<()>
    where
        P: Packet + Encode,
    {
        let mut payload = Vec::new();
        packet.encode_with_id(&mut payload)?;

        let mut buf = vec![0u8; HEADER_SIZE + payload.len()];
        buf[HEADER_SIZE..].copy_from_slice(&payload);

        let wire_len = frame_packet_plain(&mut buf, payload.len())?;
        self.stream.write_all(&buf[..wire_len]).await?;

        Ok(())
    }

    /// Sends a packet through the session cipher. Panics if the
    /// handshake has not run.
    pub async fn send<P>(&mut self, packet: &P) -> anyhow::Result<()>
    where
        P: Packet + Encode,
    {
        let cipher = self
            .out_cipher
            .as_mut()
            .context("session cipher not armed; run the handshake first")?;

        let mut payload = Vec::new();
        packet.encode_with_id(&mut payload)?;

        let mut buf = vec![0u8; HEADER_SIZE + payload.len() + PAD];
        buf[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(&payload);

        let wire_len = frame_packet(&mut buf, payload.len(), cipher)?;
        self.stream.write_all(&buf[..wire_len]).await?;

        Ok(())
    }

    /// Reads the next frame, decrypting with the session cipher when it
    /// is armed. Times out after a few seconds.
    pub async fn recv_frame(&mut self) -> anyhow::Result<PacketFrame> {
        tokio::time::timeout(RECV_TIMEOUT, self.recv_frame_inner())
            .await
            .context("timed out waiting for a server packet")?
    }

    /// Asserts that no packet arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) -> anyhow::Result<()> {
        match tokio::time::timeout(window, self.recv_frame_inner()).await {
            Err(_) => Ok(()),
            Ok(Ok(frame)) => bail!("unexpected packet {:#04x}", frame.opcode),
            Ok(Err(err)) => Err(err),
        }
    }

    /// Reads frames until one with `opcode` arrives; anything else in
    /// between is discarded.
    pub async fn recv_until(&mut self, opcode: u8) -> anyhow::Result<PacketFrame> {
        loop {
            let frame = self.recv_frame().await?;

            if frame.opcode == opcode {
                return Ok(frame);
            }
        }
    }

    /// Reads a frame and asserts its opcode.
    pub async fn expect_opcode(&mut self, opcode: u8) -> anyhow::Result<PacketFrame> {
        let frame = self.recv_frame().await?;

        if frame.opcode != opcode {
            bail!(
                "expected opcode {opcode:#04x}, got {:#04x}",
                frame.opcode
            );
        }

        Ok(frame)
    }

    async fn recv_frame_inner(&mut self) -> anyhow::Result<PacketFrame> {
        loop {
            if let Some(frame) = self.decoder.try_next_packet()? {
                return Ok(frame);
            }

            self.decoder.reserve(4096);
            let mut buf = self.decoder.take_capacity();

            if self.stream.read_buf(&mut buf).await? == 0 {
                bail!("server closed the connection");
            }

            self.decoder.queue_bytes(buf);
        }
    }

    /// Whether the peer has closed: drains any remaining frames until
    /// the stream reports EOF or reset.
    pub async fn closed_by_peer(&mut self) -> bool {
        let drained = tokio::time::timeout(RECV_TIMEOUT, async {
            loop {
                if self.recv_frame_inner().await.is_err() {
                    return;
                }
            }
        })
        .await;

        drained.is_ok()
    }

    /// Runs the opening exchange: ProtocolVersion out, KeyInit back through
    /// the static-key path, both session ciphers armed.
    pub async fn handshake(&mut self) -> anyhow::Result<KeyInit> {
        self.send_plain(&ProtocolVersion {
            version: PROTOCOL_VERSION,
        })
        .await?;

        // The key-init frame is the only one on the static path; read it
        // by hand before arming the decoder.
        let mut header = [0u8; HEADER_SIZE];
        tokio::time::timeout(RECV_TIMEOUT, self.stream.read_exact(&mut header))
            .await
            .context("timed out waiting for key init")??;

        let wire_len = u16::from_le_bytes(header) as usize;

        if wire_len <= HEADER_SIZE {
            bail!("runt key init frame");
        }

        let mut body = vec![0u8; wire_len - HEADER_SIZE];
        self.stream.read_exact(&mut body).await?;

        decrypt_static(&mut body);

        if !verify_checksum(&body) {
            bail!("key init failed its checksum");
        }

        let mut frame = PacketFrame {
            opcode: body[0],
            body: BytesMut::from(&body[1..]),
        };

        if frame.opcode != op::s2c::KEY_INIT {
            bail!("expected KeyInit, got {:#04x}", frame.opcode);
        }

        let init: KeyInit = frame.decode()?;

        self.out_cipher = Some(GameCipher::new(init.key));
        self.decoder.enable_encryption(init.key);

        Ok(init)
    }
}
