//! Chat routing and the bypass/board family.

use tracing::{debug, info};

use aden_network::PacketClass;
use aden_protocol::packets::c2s::chat::channel;
use aden_protocol::packets::c2s::{
    RequestBbsWrite, RequestBypassToServer, RequestShowBoard, Say, SendBypassBuildCmd,
};
use aden_protocol::packets::s2c::{sm, ActionFailed, CreatureSay, GmList, SystemMessage};
use aden_world::LodLevel;

use crate::dispatch::{DispatchCtx, HandlerResult, PostAction};
use crate::router::BroadcastRouter;

const MAX_CHAT_LEN: usize = 300;

pub async fn say(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: Say = ctx.decode()?;

    if pkt.text.is_empty() || pkt.text.len() > MAX_CHAT_LEN {
        return Ok(PostAction::KeepOpen);
    }

    let player = ctx.player()?;

    let line = CreatureSay {
        object_id: player.id.as_i32(),
        channel: pkt.channel,
        name: player.name.clone(),
        text: pkt.text.clone(),
    };

    match pkt.channel {
        channel::ALL => {
            ctx.reply.put_gameplay(&line)?;
            ctx.server.router().broadcast_packet_to_visible(
                player.id,
                LodLevel::Near,
                &line,
                PacketClass::Gameplay,
            );
        }
        channel::SHOUT => {
            let body = BroadcastRouter::encode(&line)?;
            ctx.server.router().broadcast_to_region(
                player.location().region(),
                &body,
                PacketClass::Gameplay,
            );
        }
        channel::TELL => {
            let Some(target_name) = pkt.target.as_deref() else {
                return Ok(PostAction::KeepOpen);
            };

            let target = ctx
                .server
                .registry()
                .get_by_player_name(target_name)
                .and_then(|conn| conn.player());

            let Some(target) = target else {
                ctx.reply
                    .put_gameplay(&SystemMessage::plain(sm::TARGET_IS_NOT_FOUND_IN_THE_GAME))?;
                return Ok(PostAction::KeepOpen);
            };

            // Respect the recipient's block list.
            let blocked = ctx
                .server
                .friends()
                .load(target.char_id)
                .await
                .map(|sets| sets.blocked.iter().any(|b| b == &player.name))
                .unwrap_or(false);

            if blocked {
                debug!(from = %player.name, to = %target.name, "whisper blocked");
                return Ok(PostAction::KeepOpen);
            }

            let delivered = ctx
                .server
                .router()
                .send_packet_to_player(target.id, &line, PacketClass::Gameplay);

            match delivered {
                Ok(()) => ctx.reply.put_gameplay(&line)?,
                Err(_) => ctx
                    .reply
                    .put_gameplay(&SystemMessage::plain(sm::TARGET_IS_NOT_FOUND_IN_THE_GAME))?,
            }
        }
        channel::PARTY => {
            let Some(party_id) = player.party_id() else {
                ctx.reply
                    .put_gameplay(&SystemMessage::plain(sm::NOT_IN_PARTY))?;
                return Ok(PostAction::KeepOpen);
            };

            if let Some(party) = ctx.server.parties().get(party_id) {
                for member in party.members {
                    let _ = ctx.server.router().send_packet_to_player(
                        member,
                        &line,
                        PacketClass::Gameplay,
                    );
                }
            }
        }
        channel::CLAN => {
            // Clan chat needs the clan roster, which lives outside the
            // core; acknowledged as a soft no-op.
        }
        other => {
            debug!(channel = other, "unknown chat channel, discarding");
        }
    }

    Ok(PostAction::KeepOpen)
}

pub async fn bypass_to_server(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestBypassToServer = ctx.decode()?;

    // NPC dialog handling is owned by the dialog engine; the core only
    // terminates the packet.
    debug!(
        conn_id = ctx.conn.conn_id(),
        command = %pkt.command,
        "npc bypass"
    );

    Ok(PostAction::KeepOpen)
}

pub async fn build_cmd(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: SendBypassBuildCmd = ctx.decode()?;
    let player = ctx.player()?;

    if player.access_level <= 0 {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    match pkt.command.as_str() {
        "gmlist" => {
            let mut names = Vec::new();

            ctx.server.registry().for_each_player(|p, _| {
                if p.access_level > 0 {
                    names.push(p.name.clone());
                }
                true
            });

            ctx.reply.put_gameplay(&GmList { names })?;
        }
        other => {
            info!(gm = %player.name, command = other, "unhandled admin command");
        }
    }

    Ok(PostAction::KeepOpen)
}

pub async fn show_board(ctx: DispatchCtx<'_>) -> HandlerResult {
    let _pkt: RequestShowBoard = ctx.decode()?;
    // The community board renders HTML owned by the board engine.
    Ok(PostAction::KeepOpen)
}

pub async fn bbs_write(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestBbsWrite = ctx.decode()?;
    debug!(path = %pkt.path, "board write ignored, no board engine");
    Ok(PostAction::KeepOpen)
}
