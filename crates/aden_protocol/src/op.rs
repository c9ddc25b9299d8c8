//! Opcode tables for both directions of the game-client connection.
//!
//! Client→server and server→client are independent namespaces. Each has a
//! one-byte primary space and an extended `u16` subspace behind a prefix
//! opcode (0xD0 inbound, 0xFE outbound).

/// Client→server opcodes.
pub mod c2s {
    pub const LOGOUT: u8 = 0x00;
    pub const REQUEST_START_PLEDGE_WAR: u8 = 0x03;
    pub const REQUEST_REPLY_START_PLEDGE_WAR: u8 = 0x04;
    pub const REQUEST_STOP_PLEDGE_WAR: u8 = 0x05;
    pub const REQUEST_REPLY_STOP_PLEDGE_WAR: u8 = 0x06;
    pub const REQUEST_SURRENDER_PLEDGE_WAR: u8 = 0x07;
    pub const PROTOCOL_VERSION: u8 = 0x0E;
    pub const MOVE_TO_LOCATION: u8 = 0x0F;
    pub const ENTER_WORLD: u8 = 0x11;
    pub const CHARACTER_SELECT: u8 = 0x12;
    pub const USE_ITEM: u8 = 0x19;
    pub const REQUEST_SOCIAL_ACTION: u8 = 0x1B;
    pub const ACTION: u8 = 0x1F;
    pub const REQUEST_BYPASS_TO_SERVER: u8 = 0x21;
    pub const REQUEST_BBS_WRITE: u8 = 0x23;
    pub const REQUEST_JOIN_PLEDGE: u8 = 0x26;
    pub const REQUEST_ANSWER_JOIN_PLEDGE: u8 = 0x27;
    pub const REQUEST_WITHDRAWAL_PLEDGE: u8 = 0x28;
    pub const REQUEST_OUST_PLEDGE_MEMBER: u8 = 0x29;
    pub const AUTH_LOGIN: u8 = 0x2B;
    pub const REQUEST_MAGIC_SKILL_USE: u8 = 0x39;
    pub const REQUEST_PLEDGE_MEMBER_LIST: u8 = 0x3C;
    pub const REQUEST_JOIN_PARTY: u8 = 0x42;
    pub const REQUEST_ANSWER_JOIN_PARTY: u8 = 0x43;
    pub const REQUEST_WITHDRAWAL_PARTY: u8 = 0x44;
    pub const REQUEST_OUST_PARTY_MEMBER: u8 = 0x45;
    pub const REQUEST_TARGET_CANCEL: u8 = 0x48;
    pub const SAY: u8 = 0x49;
    pub const REQUEST_SET_PLEDGE_CREST: u8 = 0x53;
    pub const REQUEST_ACTION_USE: u8 = 0x56;
    pub const REQUEST_RESTART: u8 = 0x57;
    pub const VALIDATE_POSITION: u8 = 0x59;
    pub const REQUEST_SHOW_BOARD: u8 = 0x5E;
    pub const REQUEST_PLEDGE_INFO: u8 = 0x65;
    pub const REQUEST_PLEDGE_CREST: u8 = 0x68;
    pub const SEND_BYPASS_BUILD_CMD: u8 = 0x74;
    pub const REQUEST_JOIN_ALLY: u8 = 0x8C;
    pub const REQUEST_ANSWER_JOIN_ALLY: u8 = 0x8D;
    pub const REQUEST_ALLY_LEAVE: u8 = 0x8E;
    pub const REQUEST_ALLY_DISMISS: u8 = 0x8F;
    pub const REQUEST_DISMISS_ALLY: u8 = 0x90;
    pub const REQUEST_SET_ALLY_CREST: u8 = 0x91;
    pub const REQUEST_ALLY_CREST: u8 = 0x92;
    pub const REQUEST_RECIPE_SHOP_MESSAGE_SET: u8 = 0xB1;
    pub const REQUEST_RECIPE_SHOP_LIST_SET: u8 = 0xB2;
    pub const REQUEST_RECIPE_SHOP_MANAGE_QUIT: u8 = 0xB3;
    pub const REQUEST_RECIPE_SHOP_MAKE_INFO: u8 = 0xB5;
    pub const REQUEST_RECIPE_SHOP_MAKE_ITEM: u8 = 0xB6;
    pub const REQUEST_RECIPE_SHOP_MANAGE_PREV: u8 = 0xB7;
    pub const REQUEST_HENNA_EQUIP: u8 = 0xBC;
    pub const REQUEST_HENNA_REMOVE: u8 = 0xBE;
    pub const REQUEST_SSQ_STATUS: u8 = 0xC7;

    /// Extended subspace, introduced by [`crate::EXT_C2S_PREFIX`].
    pub mod ex {
        pub const REQUEST_OUST_FROM_PARTY_ROOM: u16 = 0x0001;
        pub const REQUEST_DISMISS_PARTY_ROOM: u16 = 0x0002;
        pub const REQUEST_WITHDRAW_PARTY_ROOM: u16 = 0x0003;
        pub const REQUEST_CHANGE_PARTY_LEADER: u16 = 0x0004;
        pub const REQUEST_AUTO_SOUL_SHOT: u16 = 0x0005;
        pub const REQUEST_EX_ENCHANT_SKILL_INFO: u16 = 0x0006;
        pub const REQUEST_EX_ENCHANT_SKILL: u16 = 0x0007;
        pub const REQUEST_MANOR_LIST: u16 = 0x0008;
        pub const REQUEST_PROCURE_CROP_LIST: u16 = 0x0009;
        pub const REQUEST_SET_SEED: u16 = 0x000A;
        pub const REQUEST_SET_CROP: u16 = 0x000B;
        pub const REQUEST_EX_ASK_JOIN_MPCC: u16 = 0x000D;
        pub const REQUEST_EX_ACCEPT_JOIN_MPCC: u16 = 0x000E;
        pub const REQUEST_EX_OUST_FROM_MPCC: u16 = 0x000F;
        pub const REQUEST_EX_PLEDGE_CREST_LARGE: u16 = 0x0010;
        pub const REQUEST_EX_SET_PLEDGE_CREST_LARGE: u16 = 0x0011;
        pub const REQUEST_PLEDGE_POWER_GRADE_LIST: u16 = 0x0013;
        pub const REQUEST_PLEDGE_MEMBER_POWER_INFO: u16 = 0x0014;
        pub const REQUEST_PLEDGE_SET_MEMBER_POWER_GRADE: u16 = 0x0015;
        pub const REQUEST_PLEDGE_MEMBER_INFO: u16 = 0x0016;
        pub const REQUEST_PLEDGE_WAR_LIST: u16 = 0x0017;
        pub const REQUEST_DUEL_START: u16 = 0x001B;
        pub const REQUEST_DUEL_ANSWER_START: u16 = 0x001C;
        pub const REQUEST_DUEL_SURRENDER: u16 = 0x001D;
        pub const REQUEST_CONFIRM_TARGET_ITEM: u16 = 0x0026;
        pub const REQUEST_CONFIRM_REFINER_ITEM: u16 = 0x0027;
        pub const REQUEST_CONFIRM_GEM_STONE: u16 = 0x0028;
        pub const REQUEST_REFINE: u16 = 0x0029;
        pub const REQUEST_REFINE_CANCEL: u16 = 0x002A;
        pub const REQUEST_ASK_JOIN_PARTY_ROOM: u16 = 0x0030;
        pub const ANSWER_JOIN_PARTY_ROOM: u16 = 0x0031;
        pub const REQUEST_LIST_PARTY_MATCHING_WAITING_ROOM: u16 = 0x0032;
        pub const REQUEST_EXIT_PARTY_MATCHING_WAITING_ROOM: u16 = 0x0033;
        pub const REQUEST_OBSERVER_END: u16 = 0x0036;
        pub const REQUEST_OLYMPIAD_MATCH_LIST: u16 = 0x0037;
        pub const REQUEST_OLYMPIAD_OBSERVER_END: u16 = 0x0038;
    }
}

/// Server→client opcodes.
pub mod s2c {
    pub const DELETE_OBJECT: u8 = 0x08;
    pub const CHAR_SELECTION_INFO: u8 = 0x09;
    pub const AUTH_LOGIN_FAIL: u8 = 0x0A;
    pub const CHAR_SELECTED: u8 = 0x0B;
    pub const INVENTORY_ITEM_LIST: u8 = 0x11;
    pub const STATUS_UPDATE: u8 = 0x18;
    pub const NPC_HTML_MESSAGE: u8 = 0x19;
    pub const ACTION_FAILED: u8 = 0x1F;
    pub const INVENTORY_UPDATE: u8 = 0x21;
    pub const TELEPORT_TO_LOCATION: u8 = 0x22;
    pub const SOCIAL_ACTION: u8 = 0x27;
    pub const ASK_JOIN_PLEDGE: u8 = 0x2C;
    pub const JOIN_PLEDGE: u8 = 0x2D;
    pub const KEY_INIT: u8 = 0x2E;
    pub const MOVE_TO_LOCATION: u8 = 0x2F;
    pub const CHAR_INFO: u8 = 0x31;
    pub const USER_INFO: u8 = 0x32;
    pub const ASK_JOIN_PARTY: u8 = 0x39;
    pub const JOIN_PARTY: u8 = 0x3A;
    pub const SHORTCUT_INIT: u8 = 0x45;
    pub const STOP_MOVE: u8 = 0x47;
    pub const CREATURE_SAY: u8 = 0x4A;
    pub const PARTY_SMALL_WINDOW_ALL: u8 = 0x4E;
    pub const PARTY_SMALL_WINDOW_ADD: u8 = 0x4F;
    pub const PARTY_SMALL_WINDOW_DELETE_ALL: u8 = 0x50;
    pub const PARTY_SMALL_WINDOW_DELETE: u8 = 0x51;
    pub const PLEDGE_SHOW_MEMBER_LIST_ALL: u8 = 0x5A;
    pub const PLEDGE_SHOW_MEMBER_LIST_UPDATE: u8 = 0x5B;
    pub const PLEDGE_SHOW_MEMBER_LIST_DELETE: u8 = 0x5D;
    pub const SKILL_LIST: u8 = 0x5F;
    pub const SYSTEM_MESSAGE: u8 = 0x62;
    pub const PLEDGE_CREST: u8 = 0x6A;
    pub const RESTART_RESPONSE: u8 = 0x71;
    pub const GM_LIST: u8 = 0x72;
    pub const SSQ_STATUS: u8 = 0x73;
    pub const VALIDATE_LOCATION: u8 = 0x79;
    pub const LEAVE_WORLD: u8 = 0x7E;
    pub const QUEST_LIST: u8 = 0x86;
    pub const PLAY_SOUND: u8 = 0x9E;
    pub const ALLY_CREST: u8 = 0xAE;
    pub const ALLIANCE_INFO: u8 = 0xB5;
    pub const SIEGE_INFO: u8 = 0xC9;
    pub const SIEGE_ATTACKER_LIST: u8 = 0xCA;
    pub const SIEGE_DEFENDER_LIST: u8 = 0xCB;
    pub const SEND_MACRO_LIST: u8 = 0xE7;
    pub const L2_FRIEND_SAY: u8 = 0xFD;

    /// Extended subspace, introduced by [`crate::EXT_S2C_PREFIX`].
    pub mod ex {
        pub const EX_AUTO_SOUL_SHOT: u16 = 0x0012;
        pub const EX_ENCHANT_SKILL_INFO: u16 = 0x0018;
        pub const EX_SHOW_SEED_INFO: u16 = 0x001C;
        pub const EX_SHOW_CROP_INFO: u16 = 0x001D;
        pub const EX_SHOW_SEED_SETTING: u16 = 0x001F;
        pub const EX_SHOW_CROP_SETTING: u16 = 0x0020;
        pub const EX_PLEDGE_EMBLEM: u16 = 0x0027;
        pub const EX_CURSED_WEAPON_LIST: u16 = 0x0045;
        pub const EX_CURSED_WEAPON_LOCATION: u16 = 0x0046;
        pub const EX_DUEL_ASK_START: u16 = 0x004B;
        pub const EX_DUEL_READY: u16 = 0x004C;
        pub const EX_DUEL_START: u16 = 0x004D;
        pub const EX_DUEL_END: u16 = 0x004E;
        pub const EX_DUEL_UPDATE_USER_INFO: u16 = 0x004F;
        pub const EX_PUT_ITEM_RESULT_FOR_VARIATION_MAKE: u16 = 0x0053;
        pub const EX_VARIATION_RESULT: u16 = 0x0055;
    }
}
