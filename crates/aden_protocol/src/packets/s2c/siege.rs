use crate::packets::{packet, wire_struct};
use crate::{op, PacketId, EXT_S2C_PREFIX};

packet! {
    SiegeInfo(PacketId::Simple(op::s2c::SIEGE_INFO)) {
        castle_id: i32,
        /// 1 when the viewer's clan owns the castle.
        is_owner: i32,
        owner_clan: String,
        owner_leader: String,
        ally_name: String,
        /// Unix timestamp of the next siege.
        siege_time: i32,
    }
}

wire_struct! {
    SiegeClan {
        clan_id: i32,
        name: String,
        leader: String,
        crest_id: i32,
        ally_id: i32,
    }
}

packet! {
    SiegeAttackerList(PacketId::Simple(op::s2c::SIEGE_ATTACKER_LIST)) {
        castle_id: i32,
        clans: Vec<SiegeClan>,
    }
}

packet! {
    SiegeDefenderList(PacketId::Simple(op::s2c::SIEGE_DEFENDER_LIST)) {
        castle_id: i32,
        clans: Vec<SiegeClan>,
    }
}

packet! {
    /// Seven Signs status board; the page payload is produced by the
    /// (out-of-scope) event engine.
    SsqStatus(PacketId::Simple(op::s2c::SSQ_STATUS)) {
        page: u8,
        period: i32,
    }
}

packet! {
    ExCursedWeaponList(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_CURSED_WEAPON_LIST)) {
        item_ids: Vec<i32>,
    }
}

wire_struct! {
    CursedWeaponLocation {
        item_id: i32,
        activated: i32,
        x: i32,
        y: i32,
        z: i32,
    }
}

packet! {
    ExCursedWeaponLocation(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_CURSED_WEAPON_LOCATION)) {
        locations: Vec<CursedWeaponLocation>,
    }
}
