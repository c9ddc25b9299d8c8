//! Packet framing and the per-session stream cipher.
//!
//! A wire packet is `[len:u16 LE][body of len - 2 bytes]`. Once the session
//! cipher is active, the body is padded to the 8-byte cipher alignment, the
//! final 32-bit word carries an XOR checksum over the preceding words, and
//! the whole body is crypted in place. The first server→client packet
//! travels through the static-key path instead: same keystream, well-known
//! key, no key mutation.

use bytes::{Buf, BytesMut};
use thiserror::Error;

use crate::{Decode, Packet, PacketId};

/// Size of the wire length prefix.
pub const HEADER_SIZE: usize = 2;

/// Worst-case growth of a payload when framed: the checksum word plus
/// padding to the cipher block alignment. Callers reserving
/// `HEADER_SIZE + payload + PAD` bytes always have room.
pub const PAD: usize = 12;

/// Largest body a decoder accepts by default.
pub const DEFAULT_MAX_BODY_LEN: usize = 0xFFFF - HEADER_SIZE;

/// The session key is 16 bytes: 8 random bytes sent to the client in the
/// key-init packet, then this fixed tail.
pub const SESSION_KEY_TAIL: [u8; 8] = [0xc8, 0x27, 0x93, 0x01, 0xa1, 0x6c, 0x31, 0x97];

/// Key for the static first-packet path. Both sides know it a priori; it
/// protects nothing and exists so the key-init packet is not plaintext on
/// the wire.
pub const FIRST_PACKET_KEY: [u8; 16] = [
    0x94, 0x35, 0x00, 0x00, 0xa1, 0x6c, 0x54, 0x87, 0xc8, 0x27, 0x93, 0x01, 0xa1, 0x6c, 0x31, 0x97,
];

const KEY_LEN: usize = 16;
const BLOCK_ALIGN: usize = 8;
const CHECKSUM_LEN: usize = 4;

/// Errors produced while framing or un-framing packets. Any of these is
/// fatal for the connection that produced it.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid wire length {len}")]
    InvalidLength { len: usize },
    #[error("packet body of {len} bytes exceeds the cap of {max}")]
    Oversized { len: usize, max: usize },
    #[error("packet checksum mismatch")]
    BadChecksum,
    #[error("packet body too short for the cipher alignment")]
    ShortBody,
    #[error("frame buffer too small: need {need} bytes, have {have}")]
    InsufficientBuffer { need: usize, have: usize },
}

/// The mutating XOR keystream used for game-client traffic.
///
/// Each byte of output is `input ^ key[i & 15] ^ previous ciphertext byte`,
/// with the feedback chain restarting on every packet. After a packet is
/// processed the 32-bit LE integer at key offset 8 grows by the body
/// length, so the two directions must each own their own cipher instance.
#[derive(Clone)]
pub struct GameCipher {
    key: [u8; KEY_LEN],
}

impl GameCipher {
    /// Builds the cipher from the 8 dynamic bytes conveyed by the key-init
    /// packet. The static tail is appended here.
    pub fn new(dynamic: [u8; 8]) -> Self {
        let mut key = [0; KEY_LEN];
        key[..8].copy_from_slice(&dynamic);
        key[8..].copy_from_slice(&SESSION_KEY_TAIL);
        Self { key }
    }

    pub fn from_key(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Crypts `data` in place and advances the key.
    pub fn encrypt(&mut self, data: &mut [u8]) {
        let mut prev = 0u8;

        for (i, b) in data.iter_mut().enumerate() {
            let out = *b ^ self.key[i & (KEY_LEN - 1)] ^ prev;
            *b = out;
            prev = out;
        }

        self.advance(data.len());
    }

    /// Decrypts `data` in place and advances the key.
    pub fn decrypt(&mut self, data: &mut [u8]) {
        let mut prev = 0u8;

        for (i, b) in data.iter_mut().enumerate() {
            let cur = *b;
            *b = cur ^ self.key[i & (KEY_LEN - 1)] ^ prev;
            prev = cur;
        }

        self.advance(data.len());
    }

    fn advance(&mut self, len: usize) {
        let mut word = [0; 4];
        word.copy_from_slice(&self.key[8..12]);

        let next = u32::from_le_bytes(word).wrapping_add(len as u32);
        self.key[8..12].copy_from_slice(&next.to_le_bytes());
    }
}

/// One application of the static-key stream, used for the first
/// server→client packet only. The key never mutates on this path.
pub fn crypt_static(data: &mut [u8]) {
    let mut prev = 0u8;

    for (i, b) in data.iter_mut().enumerate() {
        let out = *b ^ FIRST_PACKET_KEY[i & (KEY_LEN - 1)] ^ prev;
        *b = out;
        prev = out;
    }
}

/// Inverse of [`crypt_static`].
pub fn decrypt_static(data: &mut [u8]) {
    let mut prev = 0u8;

    for (i, b) in data.iter_mut().enumerate() {
        let cur = *b;
        *b = cur ^ FIRST_PACKET_KEY[i & (KEY_LEN - 1)] ^ prev;
        prev = cur;
    }
}

/// Body length after padding: the payload, the checksum word, zero-padded
/// up to the cipher alignment.
pub fn padded_body_len(payload_len: usize) -> usize {
    (payload_len + CHECKSUM_LEN + BLOCK_ALIGN - 1) & !(BLOCK_ALIGN - 1)
}

/// Stores the XOR of all words but the last into the last word, so that the
/// XOR over the whole body is zero. `body` must be word-aligned.
pub fn append_checksum(body: &mut [u8]) {
    debug_assert!(body.len() % 4 == 0 && body.len() >= BLOCK_ALIGN);

    let mut chk = 0u32;

    for word in body[..body.len() - CHECKSUM_LEN].chunks_exact(4) {
        chk ^= u32::from_le_bytes(word.try_into().expect("chunk of 4"));
    }

    let at = body.len() - CHECKSUM_LEN;
    body[at..].copy_from_slice(&chk.to_le_bytes());
}

/// A body checksums cleanly when the XOR over all of its words is zero.
pub fn verify_checksum(body: &[u8]) -> bool {
    if body.len() % 4 != 0 || body.len() < BLOCK_ALIGN {
        return false;
    }

    let mut chk = 0u32;

    for word in body.chunks_exact(4) {
        chk ^= u32::from_le_bytes(word.try_into().expect("chunk of 4"));
    }

    chk == 0
}

fn frame_with(
    buf: &mut [u8],
    payload_len: usize,
    crypt: impl FnOnce(&mut [u8]),
) -> Result<usize, ProtocolError> {
    let body_len = padded_body_len(payload_len);
    let wire_len = HEADER_SIZE + body_len;

    if buf.len() < wire_len {
        return Err(ProtocolError::InsufficientBuffer {
            need: wire_len,
            have: buf.len(),
        });
    }

    buf[HEADER_SIZE + payload_len..wire_len].fill(0);

    let body = &mut buf[HEADER_SIZE..wire_len];
    append_checksum(body);
    crypt(body);

    // The length field covers the encrypted size.
    buf[..HEADER_SIZE].copy_from_slice(&(wire_len as u16).to_le_bytes());

    Ok(wire_len)
}

/// Frames `payload_len` bytes already written at `buf[2..]`: pads to the
/// cipher alignment, appends the checksum, encrypts in place, and writes
/// the little-endian wire length. Returns the total wire size.
///
/// Callers must reserve headroom: `buf.len() >= HEADER_SIZE + payload_len
/// + PAD`.
pub fn frame_packet(
    buf: &mut [u8],
    payload_len: usize,
    cipher: &mut GameCipher,
) -> Result<usize, ProtocolError> {
    frame_with(buf, payload_len, |body| cipher.encrypt(body))
}

/// [`frame_packet`] through the static-key path. Used exactly once per
/// connection, for the key-init packet.
pub fn frame_packet_static(buf: &mut [u8], payload_len: usize) -> Result<usize, ProtocolError> {
    frame_with(buf, payload_len, crypt_static)
}

/// Frames a plaintext packet: length prefix only, no padding, no checksum.
/// This is how client packets travel before the session cipher activates.
pub fn frame_packet_plain(buf: &mut [u8], payload_len: usize) -> Result<usize, ProtocolError> {
    let wire_len = HEADER_SIZE + payload_len;

    if buf.len() < wire_len {
        return Err(ProtocolError::InsufficientBuffer {
            need: wire_len,
            have: buf.len(),
        });
    }

    buf[..HEADER_SIZE].copy_from_slice(&(wire_len as u16).to_le_bytes());

    Ok(wire_len)
}

/// Incremental un-framer for one direction of a connection.
pub struct PacketDecoder {
    buf: BytesMut,
    cipher: Option<GameCipher>,
    max_body_len: usize,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BODY_LEN)
    }
}

impl PacketDecoder {
    pub fn new(max_body_len: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            cipher: None,
            max_body_len,
        }
    }

    /// Activates the session cipher. Frames already queued but not yet
    /// taken are still treated as plaintext; only subsequently completed
    /// frames decrypt.
    pub fn enable_encryption(&mut self, dynamic: [u8; 8]) {
        assert!(self.cipher.is_none(), "encryption is already enabled");
        self.cipher = Some(GameCipher::new(dynamic));
    }

    pub fn try_next_packet(&mut self) -> Result<Option<PacketFrame>, ProtocolError> {
        if self.buf.len() < HEADER_SIZE {
            return Ok(None);
        }

        let wire_len = u16::from_le_bytes([self.buf[0], self.buf[1]]) as usize;

        if wire_len <= HEADER_SIZE {
            return Err(ProtocolError::InvalidLength { len: wire_len });
        }

        let body_len = wire_len - HEADER_SIZE;

        if body_len > self.max_body_len {
            return Err(ProtocolError::Oversized {
                len: body_len,
                max: self.max_body_len,
            });
        }

        if self.buf.len() < wire_len {
            // Not enough data arrived yet.
            self.buf.reserve(wire_len - self.buf.len());
            return Ok(None);
        }

        self.buf.advance(HEADER_SIZE);
        let mut body = self.buf.split_to(body_len);

        if let Some(cipher) = &mut self.cipher {
            cipher.decrypt(&mut body);

            if !verify_checksum(&body) {
                return Err(ProtocolError::BadChecksum);
            }
        }

        let opcode = body[0];
        body.advance(1);

        Ok(Some(PacketFrame { opcode, body }))
    }

    pub fn queue_bytes(&mut self, bytes: BytesMut) {
        self.buf.unsplit(bytes);
    }

    pub fn queue_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn take_capacity(&mut self) -> BytesMut {
        self.buf.split_off(self.buf.len())
    }

    pub fn reserve(&mut self, additional: usize) {
        self.buf.reserve(additional);
    }
}

/// A decoded inbound packet: the primary opcode and everything after it.
/// For extended packets the subopcode is still at the front of `body`.
#[derive(Clone, Debug)]
pub struct PacketFrame {
    pub opcode: u8,
    pub body: BytesMut,
}

impl PacketFrame {
    /// Consumes the `u16` LE subopcode that follows an extended prefix.
    pub fn read_ext_subop(&mut self) -> Result<u16, ProtocolError> {
        if self.body.len() < 2 {
            return Err(ProtocolError::InvalidLength {
                len: self.body.len(),
            });
        }

        let sub = u16::from_le_bytes([self.body[0], self.body[1]]);
        self.body.advance(2);

        Ok(sub)
    }

    /// Attempts to decode this frame as packet type `P`. Trailing checksum
    /// and padding bytes are permitted after the packet fields.
    pub fn decode<'a, P>(&'a mut self) -> anyhow::Result<P>
    where
        P: Packet + Decode<'a>,
    {
        match P::ID {
            PacketId::Simple(op) => {
                anyhow::ensure!(
                    op == self.opcode,
                    "packet opcode mismatch while decoding '{}': expected {:#04x}, got {:#04x}",
                    P::NAME,
                    op,
                    self.opcode
                );
            }
            PacketId::Ext(prefix, sub) => {
                anyhow::ensure!(
                    prefix == self.opcode,
                    "extended prefix mismatch while decoding '{}'",
                    P::NAME
                );

                let got = self.read_ext_subop()?;
                anyhow::ensure!(
                    got == sub,
                    "subopcode mismatch while decoding '{}': expected {sub:#06x}, got {got:#06x}",
                    P::NAME
                );
            }
        }

        let mut r = &self.body[..];
        P::decode(&mut r)
    }
}
