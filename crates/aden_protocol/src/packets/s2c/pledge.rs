use crate::packets::{packet, wire_struct};
use crate::{op, PacketId, EXT_S2C_PREFIX};

packet! {
    AskJoinPledge(PacketId::Simple(op::s2c::ASK_JOIN_PLEDGE)) {
        requestor_id: i32,
        pledge_name: String,
    }
}

packet! {
    JoinPledge(PacketId::Simple(op::s2c::JOIN_PLEDGE)) {
        response: i32,
    }
}

wire_struct! {
    PledgeMember {
        name: String,
        level: i32,
        class_id: i32,
        sex: i32,
        object_id: i32,
        online: i32,
    }
}

packet! {
    PledgeShowMemberListAll(PacketId::Simple(op::s2c::PLEDGE_SHOW_MEMBER_LIST_ALL)) {
        clan_id: i32,
        name: String,
        leader: String,
        crest_id: i32,
        level: i32,
        castle_id: i32,
        ally_id: i32,
        ally_name: String,
        members: Vec<PledgeMember>,
    }
}

packet! {
    PledgeShowMemberListUpdate(PacketId::Simple(op::s2c::PLEDGE_SHOW_MEMBER_LIST_UPDATE)) {
        member: PledgeMember,
    }
}

packet! {
    PledgeShowMemberListDelete(PacketId::Simple(op::s2c::PLEDGE_SHOW_MEMBER_LIST_DELETE)) {
        name: String,
    }
}

packet! {
    PledgeCrest(PacketId::Simple(op::s2c::PLEDGE_CREST)) {
        crest_id: i32,
        data: Vec<u8>,
    }
}

packet! {
    AllyCrest(PacketId::Simple(op::s2c::ALLY_CREST)) {
        crest_id: i32,
        data: Vec<u8>,
    }
}

packet! {
    /// Oversized clan crest, chunked by the client.
    ExPledgeEmblem(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_PLEDGE_EMBLEM)) {
        crest_id: i32,
        data: Vec<u8>,
    }
}

packet! {
    AllianceInfo(PacketId::Simple(op::s2c::ALLIANCE_INFO)) {
        name: String,
        total_members: i32,
        online_members: i32,
        leader_clan: String,
        leader_name: String,
        clan_count: i32,
    }
}
