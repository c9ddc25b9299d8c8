//! Control-channel messages. The two directions are independent opcode
//! namespaces, both plain one-byte spaces.

/// Login server → game server.
pub mod ls2gs {
    use aden_protocol::{packet, PacketId};

    pub const INIT: u8 = 0x00;
    pub const FAIL: u8 = 0x01;
    pub const AUTH_RESPONSE: u8 = 0x02;
    pub const ID_GRANTED: u8 = 0x03;
    pub const KICK_PLAYER: u8 = 0x04;
    pub const CHANGE_PASSWORD_RESULT: u8 = 0x06;

    packet! {
        /// Opens the handshake: the RSA modulus travels scrambled; the
        /// session id salts nothing and merely tags the link in logs.
        Init(PacketId::Simple(INIT)) {
            session_id: i32,
            protocol: i32,
            modulus: [u8; 64],
        }
    }

    packet! {
        /// Registration refused; the reason code maps to
        /// [`crate::table::ControlFail`]. The link closes after this.
        Fail(PacketId::Simple(FAIL)) {
            reason: i32,
        }
    }

    packet! {
        /// Registration accepted under `server_id`.
        AuthResponse(PacketId::Simple(AUTH_RESPONSE)) {
            server_id: u8,
        }
    }

    packet! {
        /// Answer to `RequestId`: an id currently free for the taking.
        IdGranted(PacketId::Simple(ID_GRANTED)) {
            server_id: u8,
        }
    }

    packet! {
        /// The login server demands this account's client be dropped.
        KickPlayer(PacketId::Simple(KICK_PLAYER)) {
            account: String,
        }
    }

    packet! {
        ChangePasswordResult(PacketId::Simple(CHANGE_PASSWORD_RESULT)) {
            account: String,
            ok: u8,
        }
    }
}

/// Game server → login server.
pub mod gs2ls {
    use aden_protocol::{packet, PacketId};

    pub const BLOWFISH_KEY: u8 = 0x00;
    pub const GAME_SERVER_AUTH: u8 = 0x01;
    pub const PLAYER_IN_GAME: u8 = 0x02;
    pub const PLAYER_LOGOUT: u8 = 0x03;
    pub const CHANGE_PASSWORD: u8 = 0x04;
    pub const REQUEST_ID: u8 = 0x05;

    packet! {
        /// The per-link Blowfish key, RSA-encrypted under the modulus
        /// from `Init`. Everything after this packet uses the new key.
        BlowFishKey(PacketId::Simple(BLOWFISH_KEY)) {
            encrypted: Vec<u8>,
        }
    }

    packet! {
        GameServerAuth(PacketId::Simple(GAME_SERVER_AUTH)) {
            desired_id: u8,
            /// Accept a different id when the desired one is taken.
            accept_alternate: u8,
            host: String,
            port: u16,
            max_players: i32,
            hex_id: Vec<u8>,
        }
    }

    packet! {
        /// Accounts now attached to this game server (sent in batches
        /// after reconnect, singly afterwards).
        PlayerInGame(PacketId::Simple(PLAYER_IN_GAME)) {
            accounts: Vec<String>,
        }
    }

    packet! {
        PlayerLogout(PacketId::Simple(PLAYER_LOGOUT)) {
            account: String,
        }
    }

    packet! {
        ChangePassword(PacketId::Simple(CHANGE_PASSWORD)) {
            account: String,
            old_password: String,
            new_password: String,
        }
    }

    packet! {
        /// Asks for a free server id without claiming it.
        RequestId(PacketId::Simple(REQUEST_ID)) {}
    }
}
