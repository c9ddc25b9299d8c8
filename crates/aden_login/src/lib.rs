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
pub mod crypt;
pub mod framing;
pub mod packets;
pub mod session;
pub mod table;
pub mod server;

pub use client::LoginClient;
pub use crypt::{scramble_modulus, unscramble_modulus, ControlCipher, LoginKeyPair};
pub use framing::{read_control_packet, write_control_packet};
pub use session::{SessionError, SessionRegistry};
pub use server::{DenyPasswordChanges, LoginServer, PasswordBackend};
pub use table::{ControlFail, GameServerInfo, GameServerTable, ServerStatus};
