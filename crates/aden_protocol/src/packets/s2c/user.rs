//! Packets describing the player's own character and its belongings.

use crate::packets::{packet, wire_struct};
use crate::{op, PacketId, EXT_S2C_PREFIX};

packet! {
    /// Full self-description, first packet of the spawn sequence.
    UserInfo(PacketId::Simple(op::s2c::USER_INFO)) {
        object_id: i32,
        name: String,
        title: String,
        x: i32,
        y: i32,
        z: i32,
        heading: i32,
        race: i32,
        sex: i32,
        class_id: i32,
        level: i32,
        exp: i64,
        sp: i32,
        cur_hp: i32,
        max_hp: i32,
        cur_mp: i32,
        max_mp: i32,
        cur_cp: i32,
        max_cp: i32,
        karma: i32,
        pvp_flag: i32,
        clan_id: i32,
        ally_id: i32,
        walk_speed: i32,
        run_speed: i32,
        /// Private store marker, see the stance/store constants on the
        /// player model.
        private_store: u8,
    }
}

packet! {
    /// Another player's appearance, sent to observers.
    CharInfo(PacketId::Simple(op::s2c::CHAR_INFO)) {
        object_id: i32,
        name: String,
        title: String,
        x: i32,
        y: i32,
        z: i32,
        heading: i32,
        race: i32,
        sex: i32,
        class_id: i32,
        level: i32,
        clan_id: i32,
        ally_id: i32,
        pvp_flag: i32,
        karma: i32,
        walk_speed: i32,
        run_speed: i32,
        private_store: u8,
    }
}

/// Attribute discriminators for [`StatusUpdate`].
pub mod status {
    pub const LEVEL: i32 = 0x01;
    pub const EXP: i32 = 0x02;
    pub const CUR_HP: i32 = 0x09;
    pub const MAX_HP: i32 = 0x0A;
    pub const CUR_MP: i32 = 0x0B;
    pub const MAX_MP: i32 = 0x0C;
    pub const SP: i32 = 0x0D;
    pub const KARMA: i32 = 0x1B;
    pub const CUR_CP: i32 = 0x21;
    pub const MAX_CP: i32 = 0x22;
}

wire_struct! {
    StatusAttr {
        id: i32,
        value: i32,
    }
}

packet! {
    StatusUpdate(PacketId::Simple(op::s2c::STATUS_UPDATE)) {
        object_id: i32,
        attrs: Vec<StatusAttr>,
    }
}

wire_struct! {
    InventoryEntry {
        object_id: i32,
        item_id: i32,
        count: i32,
        /// Paperdoll slot when equipped, -1 otherwise.
        equip_slot: i32,
        enchant_level: i16,
    }
}

packet! {
    InventoryItemList(PacketId::Simple(op::s2c::INVENTORY_ITEM_LIST)) {
        open_window: i16,
        items: Vec<InventoryEntry>,
    }
}

/// Change discriminators for [`InventoryUpdate`].
pub mod inventory_change {
    pub const ADDED: i16 = 1;
    pub const MODIFIED: i16 = 2;
    pub const REMOVED: i16 = 3;
}

wire_struct! {
    InventoryChange {
        change: i16,
        item: InventoryEntry,
    }
}

packet! {
    InventoryUpdate(PacketId::Simple(op::s2c::INVENTORY_UPDATE)) {
        changes: Vec<InventoryChange>,
    }
}

wire_struct! {
    Shortcut {
        /// 1 = item, 2 = skill, 3 = action, 4 = macro, 5 = recipe.
        kind: i32,
        slot: i32,
        id: i32,
        level: i32,
    }
}

packet! {
    ShortCutInit(PacketId::Simple(op::s2c::SHORTCUT_INIT)) {
        shortcuts: Vec<Shortcut>,
    }
}

wire_struct! {
    SkillEntry {
        passive: i32,
        level: i32,
        id: i32,
    }
}

packet! {
    SkillList(PacketId::Simple(op::s2c::SKILL_LIST)) {
        skills: Vec<SkillEntry>,
    }
}

wire_struct! {
    QuestEntry {
        quest_id: i32,
        state: i32,
    }
}

packet! {
    QuestList(PacketId::Simple(op::s2c::QUEST_LIST)) {
        quests: Vec<QuestEntry>,
    }
}

wire_struct! {
    MacroEntry {
        id: i32,
        name: String,
        description: String,
        acronym: String,
        icon: i32,
    }
}

packet! {
    SendMacroList(PacketId::Simple(op::s2c::SEND_MACRO_LIST)) {
        revision: i32,
        macros: Vec<MacroEntry>,
    }
}

packet! {
    ExAutoSoulShot(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_AUTO_SOUL_SHOT)) {
        item_id: i32,
        enabled: i32,
    }
}

packet! {
    ExEnchantSkillInfo(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_ENCHANT_SKILL_INFO)) {
        skill_id: i32,
        level: i32,
        sp_cost: i32,
        success_rate: i32,
    }
}
