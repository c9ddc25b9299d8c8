//! End-to-end scenarios over loopback sockets: real framing, real
//! ciphers, real dispatch.

mod movement;
mod party;
mod session;
mod shutdown;
mod util;
