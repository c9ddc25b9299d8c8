//! Movement, targeting and immediate-action handlers. Geometry checks
//! run first; nothing mutates the world on a failed check.

use tracing::{debug, warn};

use aden_network::PacketClass;
use aden_protocol::packets::c2s;
use aden_protocol::packets::s2c::{
    sm, ActionFailed, SocialAction, SystemMessage, ValidateLocation,
};
use aden_protocol::packets::s2c::world::MoveToLocation as MoveToLocationS2c;
use aden_world::validate::{
    validate_move_to_location, validate_position_desync, validate_target_selection, TargetError,
};
use aden_world::{Location, LodLevel, ObjectId, Stance};

use crate::dispatch::{DispatchCtx, HandlerResult, PostAction};

pub async fn move_to_location(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: c2s::MoveToLocation = ctx.decode()?;
    let player = ctx.player()?;
    let from = player.location();

    if let Err(err) = validate_move_to_location(from, pkt.tx, pkt.ty, pkt.tz) {
        debug!(object_id = player.id.0, %err, "move request rejected");
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    let to = Location {
        x: pkt.tx,
        y: pkt.ty,
        z: pkt.tz,
        heading: from.heading,
    };

    ctx.server.world().move_object(player.id, to)?;

    let moving = MoveToLocationS2c {
        object_id: player.id.as_i32(),
        tx: pkt.tx,
        ty: pkt.ty,
        tz: pkt.tz,
        x: from.x,
        y: from.y,
        z: from.z,
    };

    // Echo to the mover, fan out to close observers.
    ctx.reply.put_gameplay(&moving)?;
    ctx.server.router().broadcast_packet_to_visible(
        player.id,
        LodLevel::Near,
        &moving,
        PacketClass::Gameplay,
    );

    Ok(PostAction::KeepOpen)
}

pub async fn validate_position(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: c2s::ValidatePosition = ctx.decode()?;
    let player = ctx.player()?;
    let server_loc = player.location();

    let desync = validate_position_desync(server_loc, pkt.x, pkt.y, pkt.z);

    if desync.critical {
        warn!(
            object_id = player.id.0,
            diff_sq = desync.diff_sq,
            "critical position desync"
        );
    }

    if desync.needs_correction {
        ctx.reply.put_gameplay(&ValidateLocation {
            object_id: player.id.as_i32(),
            x: server_loc.x,
            y: server_loc.y,
            z: server_loc.z,
            heading: server_loc.heading,
        })?;
    }

    Ok(PostAction::KeepOpen)
}

pub async fn action(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: c2s::Action = ctx.decode()?;
    let player = ctx.player()?;
    let target = ObjectId(pkt.object_id as u32);

    match validate_target_selection(
        player.id,
        player.location(),
        target,
        ctx.server.world(),
        ctx.server.visibility(),
    ) {
        Ok(obj) => {
            player.set_target(Some(obj.id()));
        }
        Err(TargetError::OutOfRange) => {
            ctx.reply
                .put_gameplay(&SystemMessage::plain(sm::TARGET_OUT_OF_RANGE))?;
        }
        Err(err) => {
            debug!(object_id = player.id.0, %err, "target selection rejected");
            ctx.reply.put_gameplay(&ActionFailed {})?;
        }
    }

    Ok(PostAction::KeepOpen)
}

pub async fn target_cancel(ctx: DispatchCtx<'_>) -> HandlerResult {
    let _pkt: c2s::RequestTargetCancel = ctx.decode()?;
    ctx.player()?.set_target(None);
    Ok(PostAction::KeepOpen)
}

pub async fn use_item(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: c2s::UseItem = ctx.decode()?;
    let player = ctx.player()?;

    if player.private_store().is_active() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    if player.find_item(ObjectId(pkt.object_id as u32)).is_none() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    // Item effects are gameplay rules owned outside the core; the
    // request is acknowledged by silence once preconditions hold.
    Ok(PostAction::KeepOpen)
}

pub async fn action_use(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: c2s::RequestActionUse = ctx.decode()?;
    let player = ctx.player()?;

    debug!(
        object_id = player.id.0,
        action_id = pkt.action_id,
        "pet/summon action without a servitor"
    );

    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

pub async fn magic_skill_use(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: c2s::RequestMagicSkillUse = ctx.decode()?;
    let player = ctx.player()?;

    if player.stance() == Stance::Sitting || player.private_store().is_active() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    // The skill pipeline lives outside the core.
    debug!(
        object_id = player.id.0,
        skill_id = pkt.skill_id,
        "skill use refused, no skill engine attached"
    );

    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

/// Social action ids the client can request.
const SOCIAL_ACTIONS: std::ops::RangeInclusive<i32> = 2..=16;

pub async fn social_action(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: c2s::RequestSocialAction = ctx.decode()?;
    let player = ctx.player()?;

    if !SOCIAL_ACTIONS.contains(&pkt.action) {
        return Ok(PostAction::KeepOpen);
    }

    if player.stance() != Stance::Standing
        || player.private_store().is_active()
        || !player.try_social_action(ctx.server.config().social_cooldown())
    {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    let social = SocialAction {
        object_id: player.id.as_i32(),
        action: pkt.action,
    };

    ctx.reply.put_gameplay(&social)?;
    ctx.server.router().broadcast_packet_to_visible(
        player.id,
        LodLevel::Near,
        &social,
        PacketClass::Gameplay,
    );

    Ok(PostAction::KeepOpen)
}
