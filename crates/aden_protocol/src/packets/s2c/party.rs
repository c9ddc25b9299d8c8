use crate::packets::{packet, wire_struct};
use crate::{op, PacketId, EXT_S2C_PREFIX};

packet! {
    AskJoinParty(PacketId::Simple(op::s2c::ASK_JOIN_PARTY)) {
        requestor: String,
        loot_rule: i32,
    }
}

packet! {
    JoinParty(PacketId::Simple(op::s2c::JOIN_PARTY)) {
        /// 1 = the invite was accepted.
        response: i32,
    }
}

wire_struct! {
    PartyMember {
        object_id: i32,
        name: String,
        cur_hp: i32,
        max_hp: i32,
        cur_mp: i32,
        max_mp: i32,
        level: i32,
        class_id: i32,
    }
}

packet! {
    PartySmallWindowAll(PacketId::Simple(op::s2c::PARTY_SMALL_WINDOW_ALL)) {
        leader_id: i32,
        loot_rule: i32,
        members: Vec<PartyMember>,
    }
}

packet! {
    PartySmallWindowAdd(PacketId::Simple(op::s2c::PARTY_SMALL_WINDOW_ADD)) {
        member: PartyMember,
    }
}

packet! {
    PartySmallWindowDelete(PacketId::Simple(op::s2c::PARTY_SMALL_WINDOW_DELETE)) {
        object_id: i32,
        name: String,
    }
}

packet! {
    PartySmallWindowDeleteAll(PacketId::Simple(op::s2c::PARTY_SMALL_WINDOW_DELETE_ALL)) {}
}

packet! {
    ExDuelAskStart(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_DUEL_ASK_START)) {
        requestor: String,
        party_duel: i32,
    }
}

packet! {
    ExDuelReady(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_DUEL_READY)) {
        party_duel: i32,
    }
}

packet! {
    ExDuelStart(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_DUEL_START)) {
        party_duel: i32,
    }
}

packet! {
    ExDuelEnd(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_DUEL_END)) {
        party_duel: i32,
    }
}

packet! {
    ExDuelUpdateUserInfo(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_DUEL_UPDATE_USER_INFO)) {
        name: String,
        object_id: i32,
        class_id: i32,
        level: i32,
        cur_hp: i32,
        max_hp: i32,
        cur_mp: i32,
        max_mp: i32,
        cur_cp: i32,
        max_cp: i32,
    }
}
