//! Client→server request packets.

pub mod auth;
pub mod chat;
pub mod movement;
pub mod party;
pub mod pledge;
pub mod workshop;

pub use auth::*;
pub use chat::*;
pub use movement::*;
pub use party::*;
pub use pledge::*;
pub use workshop::*;
