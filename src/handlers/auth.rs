//! Connection lifecycle handlers: protocol negotiation, session-key
//! validation, character selection, the spawn sequence, and the two exit
//! paths (logout and restart).

use tracing::{debug, info, warn};

use aden_network::ConnState;
use aden_protocol::packets::c2s::{AuthLogin, CharacterSelect, ProtocolVersion};
use aden_protocol::packets::s2c::{
    login_fail, AuthLoginFail, CharSelectEntry, CharSelected, CharSelectionInfo, KeyInit,
    LeaveWorld, QuestList, RestartResponse, ShortCutInit, SkillList,
};
use aden_protocol::PROTOCOL_VERSION;
use aden_world::WorldObject;

use crate::dispatch::{DispatchCtx, HandlerResult, PostAction};
use crate::handlers::{char_info, inventory_list, status_update_full, user_info};
use crate::persist::CharacterRecord;

pub async fn protocol_version(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: ProtocolVersion = ctx.decode()?;

    if pkt.version != PROTOCOL_VERSION {
        debug!(
            conn_id = ctx.conn.conn_id(),
            version = pkt.version,
            "unsupported protocol revision"
        );
        return Ok(PostAction::Close);
    }

    let key: [u8; 8] = rand::random();

    ctx.conn
        .send_key_init(
            &KeyInit {
                protocol_ok: 1,
                key,
                use_encryption: 1,
                server_id: 1,
                lang: 0,
                obfuscation_seed: 0,
            },
            key,
        )
        .map_err(|err| anyhow::anyhow!("failed to queue key init: {err}"))?;

    // Outbound side arms behind the key-init packet; inbound arms now,
    // effective from the next frame the client sends.
    Ok(PostAction::EnableEncryption(key))
}

pub async fn auth_login(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: AuthLogin = ctx.decode()?;

    if let Err(err) = ctx
        .server
        .sessions()
        .validate_and_consume(&pkt.account, pkt.keys)
    {
        warn!(
            conn_id = ctx.conn.conn_id(),
            account = %pkt.account,
            %err,
            "session key validation failed"
        );

        ctx.reply.put(&AuthLoginFail {
            reason: login_fail::ACCESS_FAILED,
        })?;

        return Ok(PostAction::Close);
    }

    ctx.server.registry().register_account(&pkt.account, ctx.conn);
    ctx.conn.set_account(&pkt.account);
    ctx.conn.set_session_key(pkt.keys);
    ctx.conn.set_state(ConnState::Authenticated);
    ctx.server.notify_player_online(&pkt.account);

    let chars = ctx
        .server
        .characters()
        .load_by_account(&pkt.account)
        .await?;

    info!(
        conn_id = ctx.conn.conn_id(),
        account = %pkt.account,
        chars = chars.len(),
        "account authenticated"
    );

    let entries = chars
        .iter()
        .map(|record| char_entry(record, &pkt.account))
        .collect();

    ctx.session.char_list = chars;
    ctx.reply.put(&CharSelectionInfo { chars: entries })?;

    Ok(PostAction::KeepOpen)
}

pub async fn character_select(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: CharacterSelect = ctx.decode()?;

    let Some(record) = usize::try_from(pkt.slot)
        .ok()
        .and_then(|slot| ctx.session.char_list.get(slot))
        .cloned()
    else {
        debug!(
            conn_id = ctx.conn.conn_id(),
            slot = pkt.slot,
            "character slot out of range"
        );
        ctx.reply
            .put_gameplay(&aden_protocol::packets::s2c::ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    };

    let account = ctx
        .conn
        .account()
        .ok_or_else(|| anyhow::anyhow!("authenticated connection without account"))?;

    let id = ctx.server.alloc_player_object_id();
    let player = std::sync::Arc::new(record.into_player(id, &account));

    let loc = player.location();

    ctx.reply.put(&CharSelected {
        name: player.name.clone(),
        char_id: player.char_id,
        title: player.title.clone(),
        session_id: ctx.conn.session_key().map_or(0, |k| k.play_ok1),
        clan_id: 0,
        sex: player.stats.sex,
        race: player.stats.race,
        class_id: player.stats.class_id,
        x: loc.x,
        y: loc.y,
        z: loc.z,
        game_time: 0,
    })?;

    ctx.session.selected = Some(player);
    ctx.conn.set_state(ConnState::Entering);

    Ok(PostAction::KeepOpen)
}

pub async fn enter_world(ctx: DispatchCtx<'_>) -> HandlerResult {
    let player = ctx
        .session
        .selected
        .take()
        .ok_or_else(|| anyhow::anyhow!("EnterWorld without a selected character"))?;

    ctx.server
        .world()
        .add_object(WorldObject::Player(player.clone()))?;
    ctx.server.visibility().register_player(&player);
    ctx.conn.bind_player(player.clone());

    // Announce to players already nearby. The position scan is used
    // because the reverse index only learns about the newcomer at the
    // next batch; self is excluded by not being in the registry yet.
    let loc = player.location();
    if let Ok(body) = crate::router::BroadcastRouter::encode(&char_info(&player)) {
        ctx.server.router().broadcast_from_position(
            loc.x,
            loc.y,
            &body,
            aden_network::PacketClass::Gameplay,
        );
    }

    ctx.server.registry().register_player(&player, ctx.conn);
    ctx.conn.set_state(ConnState::InGame);

    match ctx.server.friends().load(player.char_id).await {
        Ok(sets) => ctx.session.friend_sets = Some(sets),
        Err(err) => debug!(conn_id = ctx.conn.conn_id(), %err, "friend sets unavailable"),
    }

    // The spawn sequence, in the order the client expects.
    ctx.reply.put(&user_info(&player))?;
    ctx.reply.put(&status_update_full(&player))?;
    ctx.reply.put(&inventory_list(&player))?;
    ctx.reply.put(&ShortCutInit {
        shortcuts: Vec::new(),
    })?;
    ctx.reply.put(&SkillList { skills: Vec::new() })?;
    ctx.reply.put(&QuestList { quests: Vec::new() })?;

    info!(
        conn_id = ctx.conn.conn_id(),
        object_id = player.id.0,
        name = %player.name,
        "player entered the world"
    );

    Ok(PostAction::KeepOpen)
}

pub async fn logout(ctx: DispatchCtx<'_>) -> HandlerResult {
    if let Some(player) = ctx.conn.player() {
        if let Err(err) = ctx.server.persister().save_player(&player).await {
            warn!(object_id = player.id.0, %err, "failed to persist player on logout");
        }

        if let Some(sets) = &ctx.session.friend_sets {
            if let Err(err) = ctx.server.friends().save(player.char_id, sets).await {
                warn!(object_id = player.id.0, %err, "failed to persist friend sets");
            }
        }
    }

    ctx.server.despawn_player(ctx.conn);

    if let Some(account) = ctx.conn.account() {
        ctx.server.notify_player_offline(&account);
    }

    ctx.reply.put(&LeaveWorld {})?;
    Ok(PostAction::Close)
}

pub async fn request_restart(ctx: DispatchCtx<'_>) -> HandlerResult {
    let player = ctx.player()?;

    if let Err(err) = ctx.server.persister().save_player(&player).await {
        warn!(object_id = player.id.0, %err, "failed to persist player on restart");
    }

    ctx.server.despawn_player(ctx.conn);
    ctx.conn.set_state(ConnState::Authenticated);

    ctx.reply.put(&RestartResponse { ok: 1 })?;

    let account = ctx.conn.account().unwrap_or_default();
    let entries = ctx
        .session
        .char_list
        .iter()
        .map(|record| char_entry(record, &account))
        .collect();

    ctx.reply.put(&CharSelectionInfo { chars: entries })?;

    Ok(PostAction::KeepOpen)
}

fn char_entry(record: &CharacterRecord, account: &str) -> CharSelectEntry {
    CharSelectEntry {
        name: record.name.clone(),
        char_id: record.char_id,
        account: account.to_owned(),
        clan_id: 0,
        sex: record.stats.sex,
        race: record.stats.race,
        class_id: record.stats.class_id,
        level: record.stats.level,
        cur_hp: f64::from(record.vitals.cur_hp),
        cur_mp: f64::from(record.vitals.cur_mp),
        sp: record.stats.sp,
        exp: record.stats.exp,
        karma: record.stats.karma,
        delete_timer: 0,
        last_used: 0,
    }
}
