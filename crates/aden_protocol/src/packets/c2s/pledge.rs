use crate::packets::packet;
use crate::{op, PacketId, EXT_C2S_PREFIX};

packet! {
    RequestJoinPledge(PacketId::Simple(op::c2s::REQUEST_JOIN_PLEDGE)) {
        object_id: i32,
    }
}

packet! {
    RequestAnswerJoinPledge(PacketId::Simple(op::c2s::REQUEST_ANSWER_JOIN_PLEDGE)) {
        response: i32,
    }
}

packet! {
    RequestWithdrawalPledge(PacketId::Simple(op::c2s::REQUEST_WITHDRAWAL_PLEDGE)) {}
}

packet! {
    RequestOustPledgeMember(PacketId::Simple(op::c2s::REQUEST_OUST_PLEDGE_MEMBER)) {
        name: String,
    }
}

packet! {
    RequestPledgeInfo(PacketId::Simple(op::c2s::REQUEST_PLEDGE_INFO)) {
        clan_id: i32,
    }
}

packet! {
    RequestPledgeMemberList(PacketId::Simple(op::c2s::REQUEST_PLEDGE_MEMBER_LIST)) {
        clan_id: i32,
    }
}

packet! {
    RequestPledgeCrest(PacketId::Simple(op::c2s::REQUEST_PLEDGE_CREST)) {
        crest_id: i32,
    }
}

packet! {
    RequestSetPledgeCrest(PacketId::Simple(op::c2s::REQUEST_SET_PLEDGE_CREST)) {
        data: Vec<u8>,
    }
}

packet! {
    RequestStartPledgeWar(PacketId::Simple(op::c2s::REQUEST_START_PLEDGE_WAR)) {
        clan_name: String,
    }
}

packet! {
    RequestReplyStartPledgeWar(PacketId::Simple(op::c2s::REQUEST_REPLY_START_PLEDGE_WAR)) {
        response: i32,
    }
}

packet! {
    RequestStopPledgeWar(PacketId::Simple(op::c2s::REQUEST_STOP_PLEDGE_WAR)) {
        clan_name: String,
    }
}

packet! {
    RequestReplyStopPledgeWar(PacketId::Simple(op::c2s::REQUEST_REPLY_STOP_PLEDGE_WAR)) {
        response: i32,
    }
}

packet! {
    RequestSurrenderPledgeWar(PacketId::Simple(op::c2s::REQUEST_SURRENDER_PLEDGE_WAR)) {
        clan_name: String,
    }
}

packet! {
    RequestPledgePowerGradeList(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_PLEDGE_POWER_GRADE_LIST)) {}
}

packet! {
    RequestPledgeMemberPowerInfo(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_PLEDGE_MEMBER_POWER_INFO)) {
        name: String,
    }
}

packet! {
    RequestPledgeSetMemberPowerGrade(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_PLEDGE_SET_MEMBER_POWER_GRADE)) {
        name: String,
        grade: i32,
    }
}

packet! {
    RequestPledgeMemberInfo(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_PLEDGE_MEMBER_INFO)) {
        name: String,
    }
}

packet! {
    RequestPledgeWarList(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_PLEDGE_WAR_LIST)) {
        page: i32,
    }
}

packet! {
    RequestExPledgeCrestLarge(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_EX_PLEDGE_CREST_LARGE)) {
        crest_id: i32,
    }
}

packet! {
    RequestExSetPledgeCrestLarge(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_EX_SET_PLEDGE_CREST_LARGE)) {
        data: Vec<u8>,
    }
}

packet! {
    RequestJoinAlly(PacketId::Simple(op::c2s::REQUEST_JOIN_ALLY)) {
        object_id: i32,
    }
}

packet! {
    RequestAnswerJoinAlly(PacketId::Simple(op::c2s::REQUEST_ANSWER_JOIN_ALLY)) {
        response: i32,
    }
}

packet! {
    /// The calling clan leaves its alliance.
    RequestAllyLeave(PacketId::Simple(op::c2s::REQUEST_ALLY_LEAVE)) {}
}

packet! {
    /// The alliance leader expels a clan.
    RequestAllyDismiss(PacketId::Simple(op::c2s::REQUEST_ALLY_DISMISS)) {
        clan_name: String,
    }
}

packet! {
    /// The alliance leader dissolves the alliance.
    RequestDismissAlly(PacketId::Simple(op::c2s::REQUEST_DISMISS_ALLY)) {}
}

packet! {
    RequestSetAllyCrest(PacketId::Simple(op::c2s::REQUEST_SET_ALLY_CREST)) {
        data: Vec<u8>,
    }
}

packet! {
    RequestAllyCrest(PacketId::Simple(op::c2s::REQUEST_ALLY_CREST)) {
        crest_id: i32,
    }
}
