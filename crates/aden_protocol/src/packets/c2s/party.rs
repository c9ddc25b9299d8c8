use crate::packets::packet;
use crate::{op, PacketId, EXT_C2S_PREFIX};

packet! {
    RequestJoinParty(PacketId::Simple(op::c2s::REQUEST_JOIN_PARTY)) {
        name: String,
        loot_rule: i32,
    }
}

packet! {
    RequestAnswerJoinParty(PacketId::Simple(op::c2s::REQUEST_ANSWER_JOIN_PARTY)) {
        /// 1 = accept, anything else declines.
        response: i32,
    }
}

packet! {
    RequestWithdrawalParty(PacketId::Simple(op::c2s::REQUEST_WITHDRAWAL_PARTY)) {}
}

packet! {
    RequestOustPartyMember(PacketId::Simple(op::c2s::REQUEST_OUST_PARTY_MEMBER)) {
        name: String,
    }
}

packet! {
    RequestChangePartyLeader(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_CHANGE_PARTY_LEADER)) {
        name: String,
    }
}

packet! {
    RequestDuelStart(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_DUEL_START)) {
        name: String,
        party_duel: i32,
    }
}

packet! {
    RequestDuelAnswerStart(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_DUEL_ANSWER_START)) {
        party_duel: i32,
        response: i32,
    }
}

packet! {
    RequestDuelSurrender(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_DUEL_SURRENDER)) {}
}
