//! Clan and alliance packet terminators.
//!
//! Clan rules (rosters, ranks, wars, crest storage) are gameplay systems
//! outside the core. These handlers validate what they can against the
//! player model and answer with the refusal or empty-payload packet the
//! client needs to stay responsive.

use tracing::debug;

use aden_protocol::packets::c2s::{
    RequestAllyCrest, RequestAnswerJoinPledge, RequestExPledgeCrestLarge, RequestJoinPledge,
    RequestOustPledgeMember, RequestPledgeCrest, RequestPledgeInfo, RequestPledgeMemberList,
    RequestWithdrawalPledge,
};
use aden_protocol::packets::s2c::{
    ActionFailed, AllyCrest, ExPledgeEmblem, JoinPledge, PledgeCrest,
};
use aden_world::ObjectId;

use crate::dispatch::{DispatchCtx, HandlerResult, PostAction};

pub async fn join_pledge(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestJoinPledge = ctx.decode()?;
    let player = ctx.player()?;

    // Without a clan table entry the inviter cannot extend invitations.
    if player.clan_id().is_none()
        || ctx
            .server
            .world()
            .get_player(ObjectId(pkt.object_id as u32))
            .is_none()
    {
        ctx.reply.put_gameplay(&ActionFailed {})?;
    }

    Ok(PostAction::KeepOpen)
}

pub async fn answer_join_pledge(ctx: DispatchCtx<'_>) -> HandlerResult {
    let _pkt: RequestAnswerJoinPledge = ctx.decode()?;

    // No pledge invite can be pending while the clan system is external.
    ctx.reply.put_gameplay(&JoinPledge { response: 0 })?;
    Ok(PostAction::KeepOpen)
}

pub async fn withdraw_pledge(ctx: DispatchCtx<'_>) -> HandlerResult {
    let _pkt: RequestWithdrawalPledge = ctx.decode()?;

    if ctx.player()?.clan_id().is_none() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
    }

    Ok(PostAction::KeepOpen)
}

pub async fn oust_pledge_member(ctx: DispatchCtx<'_>) -> HandlerResult {
    let _pkt: RequestOustPledgeMember = ctx.decode()?;

    if ctx.player()?.clan_id().is_none() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
    }

    Ok(PostAction::KeepOpen)
}

pub async fn pledge_info(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestPledgeInfo = ctx.decode()?;
    debug!(clan_id = pkt.clan_id, "pledge info requested, no clan table");
    Ok(PostAction::KeepOpen)
}

pub async fn pledge_member_list(ctx: DispatchCtx<'_>) -> HandlerResult {
    let _pkt: RequestPledgeMemberList = ctx.decode()?;
    Ok(PostAction::KeepOpen)
}

pub async fn pledge_crest(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestPledgeCrest = ctx.decode()?;

    ctx.reply.put_gameplay(&PledgeCrest {
        crest_id: pkt.crest_id,
        data: Vec::new(),
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn set_pledge_crest(ctx: DispatchCtx<'_>) -> HandlerResult {
    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

pub async fn pledge_crest_large(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestExPledgeCrestLarge = ctx.decode()?;

    ctx.reply.put_gameplay(&ExPledgeEmblem {
        crest_id: pkt.crest_id,
        data: Vec::new(),
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn set_pledge_crest_large(ctx: DispatchCtx<'_>) -> HandlerResult {
    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

pub async fn ally_crest(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestAllyCrest = ctx.decode()?;

    ctx.reply.put_gameplay(&AllyCrest {
        crest_id: pkt.crest_id,
        data: Vec::new(),
    })?;

    Ok(PostAction::KeepOpen)
}

/// Pledge war declarations and replies: refused while clan state is
/// external.
pub async fn pledge_war_action(ctx: DispatchCtx<'_>) -> HandlerResult {
    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

/// Alliance membership mutations: refused without an alliance record.
pub async fn ally_action(ctx: DispatchCtx<'_>) -> HandlerResult {
    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

/// Rank and privilege queries: acknowledged without payload.
pub async fn pledge_power_stub(ctx: DispatchCtx<'_>) -> HandlerResult {
    debug!(conn_id = ctx.conn.conn_id(), "pledge power query ignored");
    Ok(PostAction::KeepOpen)
}
