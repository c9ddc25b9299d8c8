//! Party membership choreography over the party registry.

use std::sync::Arc;

use tracing::debug;

use aden_network::PacketClass;
use aden_protocol::packets::c2s::{
    RequestAnswerJoinParty, RequestChangePartyLeader, RequestJoinParty, RequestOustPartyMember,
    RequestWithdrawalParty,
};
use aden_protocol::packets::s2c::{
    sm, ActionFailed, AskJoinParty, JoinParty, PartySmallWindowAdd, PartySmallWindowAll,
    PartySmallWindowDelete, PartySmallWindowDeleteAll, SmParam, SystemMessage,
};
use aden_world::player::PartyInvite;
use aden_world::Player;

use crate::dispatch::{DispatchCtx, HandlerResult, PostAction};
use crate::handlers::party_member_entry;
use crate::party::{Party, PartyError, RemoveOutcome, MAX_PARTY_MEMBERS};
use crate::server::GameServer;

pub async fn join_party(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestJoinParty = ctx.decode()?;
    let player = ctx.player()?;

    if pkt.name == player.name {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    let target = ctx
        .server
        .registry()
        .get_by_player_name(&pkt.name)
        .and_then(|conn| conn.player());

    let Some(target) = target else {
        ctx.reply
            .put_gameplay(&SystemMessage::plain(sm::TARGET_IS_NOT_FOUND_IN_THE_GAME))?;
        return Ok(PostAction::KeepOpen);
    };

    // An inviter already in a party must lead it and have room.
    if let Some(party_id) = player.party_id() {
        let Some(party) = ctx.server.parties().get(party_id) else {
            ctx.reply.put_gameplay(&ActionFailed {})?;
            return Ok(PostAction::KeepOpen);
        };

        if party.leader != player.id {
            ctx.reply.put_gameplay(&SystemMessage::plain(
                sm::ONLY_THE_LEADER_CAN_GIVE_OUT_INVITATIONS,
            ))?;
            return Ok(PostAction::KeepOpen);
        }

        if party.members.len() >= MAX_PARTY_MEMBERS {
            ctx.reply
                .put_gameplay(&SystemMessage::plain(sm::PARTY_FULL))?;
            return Ok(PostAction::KeepOpen);
        }
    }

    if target.party_id().is_some() {
        ctx.reply.put_gameplay(&SystemMessage {
            message_id: sm::ALREADY_IN_PARTY,
            params: vec![SmParam::Text(target.name.clone())],
        })?;
        return Ok(PostAction::KeepOpen);
    }

    if !target.offer_party_invite(PartyInvite {
        from: player.id,
        loot_rule: pkt.loot_rule,
    }) {
        ctx.reply
            .put_gameplay(&SystemMessage::plain(sm::WAITING_FOR_ANOTHER_REPLY))?;
        return Ok(PostAction::KeepOpen);
    }

    let ask = AskJoinParty {
        requestor: player.name.clone(),
        loot_rule: pkt.loot_rule,
    };

    if ctx
        .server
        .router()
        .send_packet_to_player(target.id, &ask, PacketClass::Gameplay)
        .is_err()
    {
        target.take_party_invite();
        ctx.reply
            .put_gameplay(&SystemMessage::plain(sm::TARGET_IS_NOT_FOUND_IN_THE_GAME))?;
    }

    Ok(PostAction::KeepOpen)
}

pub async fn answer_join_party(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestAnswerJoinParty = ctx.decode()?;
    let player = ctx.player()?;

    let Some(invite) = player.take_party_invite() else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    let requestor = ctx
        .server
        .registry()
        .get_by_object_id(invite.from)
        .and_then(|conn| conn.player());

    let Some(requestor) = requestor else {
        ctx.reply
            .put_gameplay(&SystemMessage::plain(sm::TARGET_IS_NOT_FOUND_IN_THE_GAME))?;
        return Ok(PostAction::KeepOpen);
    };

    if pkt.response != 1 {
        let _ = ctx.server.router().send_packet_to_player(
            requestor.id,
            &JoinParty { response: 0 },
            PacketClass::Gameplay,
        );
        let _ = ctx.server.router().send_packet_to_player(
            requestor.id,
            &SystemMessage::plain(sm::PLAYER_DECLINED),
            PacketClass::Gameplay,
        );
        return Ok(PostAction::KeepOpen);
    }

    if player.party_id().is_some() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    let party = if let Some(party_id) = requestor.party_id() {
        match ctx.server.parties().add_member(party_id, player.id) {
            Ok(party) => party,
            Err(PartyError::Full) => {
                ctx.reply
                    .put_gameplay(&SystemMessage::plain(sm::PARTY_FULL))?;
                return Ok(PostAction::KeepOpen);
            }
            Err(err) => {
                debug!(%err, "party join failed");
                ctx.reply.put_gameplay(&ActionFailed {})?;
                return Ok(PostAction::KeepOpen);
            }
        }
    } else {
        let party = ctx
            .server
            .parties()
            .create(requestor.id, player.id, invite.loot_rule);
        requestor.set_party_id(Some(party.id));
        party
    };

    player.set_party_id(Some(party.id));

    ctx.reply.put_gameplay(&JoinParty { response: 1 })?;
    ctx.reply
        .put_gameplay(&window_all(ctx.server, &party))?;

    let add = PartySmallWindowAdd {
        member: party_member_entry(&player),
    };
    let joined = SystemMessage {
        message_id: sm::HAS_JOINED_THE_PARTY,
        params: vec![SmParam::Text(player.name.clone())],
    };

    for member in &party.members {
        if *member == player.id {
            continue;
        }

        let _ = ctx
            .server
            .router()
            .send_packet_to_player(*member, &add, PacketClass::Gameplay);
        let _ = ctx
            .server
            .router()
            .send_packet_to_player(*member, &joined, PacketClass::Gameplay);
    }

    Ok(PostAction::KeepOpen)
}

pub async fn withdraw_party(ctx: DispatchCtx<'_>) -> HandlerResult {
    let _pkt: RequestWithdrawalParty = ctx.decode()?;
    let player = ctx.player()?;

    let Some(party_id) = player.party_id() else {
        ctx.reply
            .put_gameplay(&SystemMessage::plain(sm::NOT_IN_PARTY))?;
        return Ok(PostAction::KeepOpen);
    };

    ctx.reply
        .put_gameplay(&SystemMessage::plain(sm::YOU_LEFT_THE_PARTY))?;
    ctx.reply.put_gameplay(&PartySmallWindowDeleteAll {})?;

    remove_and_notify(ctx.server, party_id, &player, sm::PLAYER_LEFT_THE_PARTY);

    Ok(PostAction::KeepOpen)
}

pub async fn oust_party_member(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestOustPartyMember = ctx.decode()?;
    let player = ctx.player()?;

    let Some(party_id) = player.party_id() else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    let Some(party) = ctx.server.parties().get(party_id) else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    if party.leader != player.id {
        ctx.reply.put_gameplay(&SystemMessage::plain(
            sm::ONLY_THE_LEADER_CAN_GIVE_OUT_INVITATIONS,
        ))?;
        return Ok(PostAction::KeepOpen);
    }

    let target = ctx
        .server
        .registry()
        .get_by_player_name(&pkt.name)
        .and_then(|conn| conn.player())
        .filter(|target| party.contains(target.id) && target.id != player.id);

    let Some(target) = target else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    let _ = ctx.server.router().send_packet_to_player(
        target.id,
        &SystemMessage::plain(sm::DISMISSED_FROM_THE_PARTY),
        PacketClass::Gameplay,
    );
    let _ = ctx.server.router().send_packet_to_player(
        target.id,
        &PartySmallWindowDeleteAll {},
        PacketClass::Gameplay,
    );

    remove_and_notify(ctx.server, party_id, &target, sm::PLAYER_LEFT_THE_PARTY);

    Ok(PostAction::KeepOpen)
}

pub async fn change_party_leader(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestChangePartyLeader = ctx.decode()?;
    let player = ctx.player()?;

    let Some(party_id) = player.party_id() else {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    let leader_ok = ctx
        .server
        .parties()
        .get(party_id)
        .is_some_and(|party| party.leader == player.id);

    if !leader_ok {
        ctx.reply.put_gameplay(&SystemMessage::plain(
            sm::ONLY_THE_LEADER_CAN_GIVE_OUT_INVITATIONS,
        ))?;
        return Ok(PostAction::KeepOpen);
    }

    let new_leader = ctx
        .server
        .registry()
        .get_by_player_name(&pkt.name)
        .and_then(|conn| conn.player());

    let Some(new_leader) = new_leader else {
        ctx.reply
            .put_gameplay(&SystemMessage::plain(sm::TARGET_IS_NOT_FOUND_IN_THE_GAME))?;
        return Ok(PostAction::KeepOpen);
    };

    match ctx.server.parties().set_leader(party_id, new_leader.id) {
        Ok(party) => {
            // Everyone redraws the window with the new leader first.
            let window = window_all(ctx.server, &party);

            for member in &party.members {
                let _ = ctx
                    .server
                    .router()
                    .send_packet_to_player(*member, &window, PacketClass::Gameplay);
            }
        }
        Err(err) => {
            debug!(%err, "leader change failed");
            ctx.reply.put_gameplay(&ActionFailed {})?;
        }
    }

    Ok(PostAction::KeepOpen)
}

/// Removes `leaver` from the party, clears its membership slot, and
/// notifies whoever remains (or tears the party down entirely). Also
/// runs on despawn, so it must never touch the leaver's connection.
pub(crate) fn remove_and_notify(
    server: &GameServer,
    party_id: aden_world::PartyId,
    leaver: &Arc<Player>,
    notice: i32,
) {
    leaver.set_party_id(None);

    let outcome = match server.parties().remove_member(party_id, leaver.id) {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!(%err, "party removal failed");
            return;
        }
    };

    let left = SystemMessage {
        message_id: notice,
        params: vec![SmParam::Text(leaver.name.clone())],
    };

    match outcome {
        RemoveOutcome::Remaining(party) => {
            let delete = PartySmallWindowDelete {
                object_id: leaver.id.as_i32(),
                name: leaver.name.clone(),
            };

            for member in &party.members {
                let _ = server
                    .router()
                    .send_packet_to_player(*member, &delete, PacketClass::Gameplay);
                let _ = server
                    .router()
                    .send_packet_to_player(*member, &left, PacketClass::Gameplay);
            }
        }
        RemoveOutcome::Disbanded(members) => {
            for member in members {
                if let Some(remaining) = server.world().get_player(member) {
                    remaining.set_party_id(None);
                }

                let _ = server.router().send_packet_to_player(
                    member,
                    &SystemMessage::plain(sm::PARTY_DISPERSED),
                    PacketClass::Gameplay,
                );
                let _ = server.router().send_packet_to_player(
                    member,
                    &PartySmallWindowDeleteAll {},
                    PacketClass::Gameplay,
                );
            }
        }
    }
}

fn window_all(server: &GameServer, party: &Party) -> PartySmallWindowAll {
    let members = party
        .members
        .iter()
        .filter_map(|id| server.world().get_player(*id))
        .map(|player| party_member_entry(&player))
        .collect();

    PartySmallWindowAll {
        leader_id: party.leader.as_i32(),
        loot_rule: party.loot_rule,
        members,
    }
}
