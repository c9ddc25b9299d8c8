use crate::packets::{packet, wire_struct};
use crate::{op, PacketId};

/// Reason codes for [`AuthLoginFail`].
pub mod login_fail {
    pub const SYSTEM_ERROR: i32 = 0x01;
    pub const PASSWORD_WRONG: i32 = 0x02;
    pub const ACCESS_FAILED: i32 = 0x04;
    pub const ALREADY_IN_USE: i32 = 0x07;
}

packet! {
    /// The one packet written through the static-key path. Carries the
    /// dynamic half of the session cipher key plus protocol sanity flags.
    KeyInit(PacketId::Simple(op::s2c::KEY_INIT)) {
        /// 1 when the announced protocol revision is acceptable.
        protocol_ok: u8,
        key: [u8; 8],
        use_encryption: i32,
        server_id: i32,
        lang: u8,
        obfuscation_seed: i32,
    }
}

packet! {
    AuthLoginFail(PacketId::Simple(op::s2c::AUTH_LOGIN_FAIL)) {
        reason: i32,
    }
}

wire_struct! {
    /// One selectable character on the account.
    #[derive(Default)]
    CharSelectEntry {
        name: String,
        char_id: i32,
        account: String,
        clan_id: i32,
        sex: i32,
        race: i32,
        class_id: i32,
        level: i32,
        cur_hp: f64,
        cur_mp: f64,
        sp: i32,
        exp: i64,
        karma: i32,
        /// Seconds until deletion, 0 when not flagged.
        delete_timer: i32,
        last_used: u8,
    }
}

packet! {
    CharSelectionInfo(PacketId::Simple(op::s2c::CHAR_SELECTION_INFO)) {
        chars: Vec<CharSelectEntry>,
    }
}

packet! {
    /// Acknowledges a character pick; the client then issues EnterWorld.
    CharSelected(PacketId::Simple(op::s2c::CHAR_SELECTED)) {
        name: String,
        char_id: i32,
        title: String,
        session_id: i32,
        clan_id: i32,
        sex: i32,
        race: i32,
        class_id: i32,
        x: i32,
        y: i32,
        z: i32,
        game_time: i32,
    }
}

packet! {
    RestartResponse(PacketId::Simple(op::s2c::RESTART_RESPONSE)) {
        ok: i32,
    }
}

packet! {
    LeaveWorld(PacketId::Simple(op::s2c::LEAVE_WORLD)) {}
}
