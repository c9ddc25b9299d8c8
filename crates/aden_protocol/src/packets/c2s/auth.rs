use crate::packets::packet;
use crate::{op, PacketId, SessionKey};

packet! {
    /// First packet of every connection; anything else in the CONNECTED
    /// state is discarded.
    ProtocolVersion(PacketId::Simple(op::c2s::PROTOCOL_VERSION)) {
        version: i32,
    }
}

packet! {
    /// Presents the session key minted by the login server. The four ints
    /// must match the stored key exactly.
    AuthLogin(PacketId::Simple(op::c2s::AUTH_LOGIN)) {
        account: String,
        keys: SessionKey,
    }
}

packet! {
    CharacterSelect(PacketId::Simple(op::c2s::CHARACTER_SELECT)) {
        slot: i32,
    }
}

packet! {
    EnterWorld(PacketId::Simple(op::c2s::ENTER_WORLD)) {}
}

packet! {
    Logout(PacketId::Simple(op::c2s::LOGOUT)) {}
}

packet! {
    /// Leave the world but keep the session: back to character selection.
    RequestRestart(PacketId::Simple(op::c2s::REQUEST_RESTART)) {}
}
