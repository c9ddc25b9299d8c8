//! Server→client packets.

pub mod auth;
pub mod manor;
pub mod party;
pub mod pledge;
pub mod siege;
pub mod system;
pub mod user;
pub mod world;

pub use auth::*;
pub use manor::*;
pub use party::*;
pub use pledge::*;
pub use siege::*;
pub use system::*;
pub use user::*;
pub use world::*;
