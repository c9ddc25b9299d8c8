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

pub mod client;
pub mod outbound;
pub mod pool;
pub mod registry;
mod state;

pub use client::{detached_handle, establish, outbound_body, ClientHandle, ClientSession, NetSettings};
pub use outbound::{OutboundPacket, PacketClass, SendError};
pub use pool::BufferPool;
pub use registry::ClientRegistry;
pub use state::ConnState;
