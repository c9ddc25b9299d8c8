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

pub mod object;
pub mod player;
pub mod region;
pub mod validate;
pub mod visibility;
pub mod world;

pub use object::{GroundItem, Npc, NpcKind, ObjectId, ObjectKind, Servitor, WorldObject};
pub use player::{ClanId, PartyId, Player, PlayerStats, PrivateStore, Stance, Vitals};
pub use region::{Location, LodBucket, LodLevel, RegionPos};
pub use visibility::VisibilityManager;
pub use world::{World, WorldError};
