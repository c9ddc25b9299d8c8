#![doc = include_str!("../README.md")]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    rustdoc::missing_crate_level_docs,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls,
    rustdoc::invalid_html_tags
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_lifetimes,
    unused_import_braces,
    unreachable_pub,
    clippy::dbg_macro
)]

pub mod codec;
mod impls;
pub mod op;
pub mod packets;
mod session_key;

use std::io::Write;

pub use codec::{PacketDecoder, PacketFrame, ProtocolError};
pub use session_key::SessionKey;

/// The client protocol revision this library targets (Interlude).
pub const PROTOCOL_VERSION: i32 = 0x0106;

/// Prefix opcode that introduces the extended client→server subspace.
pub const EXT_C2S_PREFIX: u8 = 0xD0;

/// Prefix opcode that introduces the extended server→client subspace.
pub const EXT_S2C_PREFIX: u8 = 0xFE;

/// The `Encode` trait allows objects to be written to the wire.
///
/// Numeric fields are little-endian, strings are UTF-16LE with a two-byte
/// null terminator, booleans are one byte.
pub trait Encode {
    fn encode(&self, w: impl Write) -> anyhow::Result<()>;
}

/// The `Decode` trait allows objects to be read from a packet body.
///
/// The slice reference is advanced past the consumed input.
pub trait Decode<'a>: Sized {
    fn decode(r: &mut &'a [u8]) -> anyhow::Result<Self>;
}

/// The identity of a packet inside its direction's opcode namespace.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PacketId {
    /// A plain one-byte opcode.
    Simple(u8),
    /// An extended packet: prefix opcode followed by a `u16` LE subopcode.
    Ext(u8, u16),
}

impl PacketId {
    pub const fn prefix(self) -> u8 {
        match self {
            PacketId::Simple(op) | PacketId::Ext(op, _) => op,
        }
    }
}

/// Types that represent one packet of the catalogue.
pub trait Packet {
    const ID: PacketId;
    const NAME: &'static str;

    /// Writes the opcode bytes followed by the packet body.
    fn encode_with_id(&self, mut w: impl Write) -> anyhow::Result<()>
    where
        Self: Encode,
    {
        match Self::ID {
            PacketId::Simple(op) => w.write_all(&[op])?,
            PacketId::Ext(prefix, sub) => {
                w.write_all(&[prefix])?;
                w.write_all(&sub.to_le_bytes())?;
            }
        }

        self.encode(w)
    }
}
