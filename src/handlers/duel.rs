//! Duel negotiation: challenge, answer, surrender. Combat resolution is
//! a gameplay rule outside the core; what lives here is the invite slot,
//! the duel pairing and the Ex-packet choreography.

use std::sync::Arc;

use tracing::debug;

use aden_network::PacketClass;
use aden_protocol::packets::c2s::{
    RequestDuelAnswerStart, RequestDuelStart, RequestDuelSurrender,
};
use aden_protocol::packets::s2c::{
    ActionFailed, ExDuelAskStart, ExDuelEnd, ExDuelReady, ExDuelStart, ExDuelUpdateUserInfo,
};
use aden_world::player::DuelInvite;
use aden_world::Player;

use crate::dispatch::{DispatchCtx, HandlerResult, PostAction};

pub async fn duel_start(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestDuelStart = ctx.decode()?;
    let player = ctx.player()?;

    if pkt.name == player.name || player.duel_id().is_some() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    let target = ctx
        .server
        .registry()
        .get_by_player_name(&pkt.name)
        .and_then(|conn| conn.player())
        .filter(|target| target.duel_id().is_none());

    let Some(target) = target else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    if !target.offer_duel_invite(DuelInvite {
        from: player.id,
        party_duel: pkt.party_duel != 0,
    }) {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    let ask = ExDuelAskStart {
        requestor: player.name.clone(),
        party_duel: pkt.party_duel,
    };

    if ctx
        .server
        .router()
        .send_packet_to_player(target.id, &ask, PacketClass::Gameplay)
        .is_err()
    {
        target.take_duel_invite();
        ctx.reply.put_gameplay(&ActionFailed {})?;
    }

    Ok(PostAction::KeepOpen)
}

pub async fn duel_answer_start(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestDuelAnswerStart = ctx.decode()?;
    let player = ctx.player()?;

    let Some(invite) = player.take_duel_invite() else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    let challenger = ctx
        .server
        .registry()
        .get_by_object_id(invite.from)
        .and_then(|conn| conn.player());

    let Some(challenger) = challenger else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    let party_duel = i32::from(invite.party_duel);

    if pkt.response != 1 {
        let _ = ctx.server.router().send_packet_to_player(
            challenger.id,
            &ExDuelEnd { party_duel },
            PacketClass::Gameplay,
        );
        return Ok(PostAction::KeepOpen);
    }

    if challenger.duel_id().is_some() || player.duel_id().is_some() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    let duel_id = ctx.server.start_duel(challenger.id, player.id);
    challenger.set_duel_id(Some(duel_id));
    player.set_duel_id(Some(duel_id));

    debug!(duel_id, a = challenger.id.0, b = player.id.0, "duel started");

    let ready = ExDuelReady { party_duel };
    let start = ExDuelStart { party_duel };

    ctx.reply.put_gameplay(&ready)?;
    ctx.reply.put_gameplay(&start)?;
    ctx.reply.put_gameplay(&duel_info(&challenger))?;

    let _ = ctx
        .server
        .router()
        .send_packet_to_player(challenger.id, &ready, PacketClass::Gameplay);
    let _ = ctx
        .server
        .router()
        .send_packet_to_player(challenger.id, &start, PacketClass::Gameplay);
    let _ = ctx.server.router().send_packet_to_player(
        challenger.id,
        &duel_info(&player),
        PacketClass::Gameplay,
    );

    Ok(PostAction::KeepOpen)
}

pub async fn duel_surrender(ctx: DispatchCtx<'_>) -> HandlerResult {
    let _pkt: RequestDuelSurrender = ctx.decode()?;
    let player = ctx.player()?;

    let Some(duel_id) = player.duel_id() else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    let end = ExDuelEnd { party_duel: 0 };
    ctx.reply.put_gameplay(&end)?;

    if let Some((a, b)) = ctx.server.end_duel(duel_id) {
        for id in [a, b] {
            if let Some(other) = ctx.server.world().get_player(id) {
                other.set_duel_id(None);
            }

            if id != player.id {
                let _ = ctx
                    .server
                    .router()
                    .send_packet_to_player(id, &end, PacketClass::Gameplay);
            }
        }
    }

    player.set_duel_id(None);

    Ok(PostAction::KeepOpen)
}

fn duel_info(player: &Arc<Player>) -> ExDuelUpdateUserInfo {
    let vitals = player.vitals();

    ExDuelUpdateUserInfo {
        name: player.name.clone(),
        object_id: player.id.as_i32(),
        class_id: player.stats.class_id,
        level: player.stats.level,
        cur_hp: vitals.cur_hp,
        max_hp: vitals.max_hp,
        cur_mp: vitals.cur_mp,
        max_mp: vitals.max_mp,
        cur_cp: vitals.cur_cp,
        max_cp: vitals.max_cp,
    }
}
