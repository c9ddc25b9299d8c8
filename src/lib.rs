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
    clippy::dbg_macro
)]

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod party;
pub mod persist;
pub mod router;
pub mod server;
pub mod testing;

#[cfg(test)]
mod tests;

pub use config::ServerConfig;
pub use dispatch::{DispatchCtx, HandlerEntry, PostAction, ReplyBuf, SessionCtx, StateMask};
pub use party::PartyRegistry;
pub use router::BroadcastRouter;
pub use server::{GameServer, GameServerDeps};

pub use aden_login as login;
pub use aden_network as network;
pub use aden_protocol as protocol;
pub use aden_world as world;
