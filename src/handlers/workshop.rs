//! Workshop-family handlers: augmentation confirmation flow, recipe
//! shops (which drive the private-store marker), henna, soulshot
//! automation, skill enchanting, manor administration and the Seven
//! Signs status board.

use tracing::debug;

use aden_protocol::packets::c2s::{
    RequestAutoSoulShot, RequestConfirmGemStone, RequestConfirmRefinerItem,
    RequestConfirmTargetItem, RequestExEnchantSkillInfo, RequestProcureCropList,
    RequestRecipeShopListSet, RequestRecipeShopMessageSet, RequestRefine, RequestSetCrop,
    RequestSetSeed, RequestSsqStatus,
};
use aden_protocol::packets::s2c::{
    ActionFailed, ExAutoSoulShot, ExEnchantSkillInfo, ExPutItemResultForVariationMake,
    ExShowCropInfo, ExShowSeedSetting, ExVariationResult, SsqStatus,
};
use aden_world::{ObjectId, PrivateStore};

use crate::dispatch::{DispatchCtx, HandlerResult, PostAction};
use crate::handlers::user_info;

pub async fn auto_soul_shot(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestAutoSoulShot = ctx.decode()?;
    let player = ctx.player()?;

    if player.find_item(ObjectId(pkt.item_id as u32)).is_none() && pkt.enable != 0 {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    ctx.reply.put_gameplay(&ExAutoSoulShot {
        item_id: pkt.item_id,
        enabled: pkt.enable,
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn enchant_skill_info(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestExEnchantSkillInfo = ctx.decode()?;

    ctx.reply.put_gameplay(&ExEnchantSkillInfo {
        skill_id: pkt.skill_id,
        level: pkt.level,
        sp_cost: pkt.level.saturating_mul(1000),
        success_rate: 82,
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn enchant_skill(ctx: DispatchCtx<'_>) -> HandlerResult {
    // Enchant resolution needs the skill engine.
    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

pub async fn manor_list(ctx: DispatchCtx<'_>) -> HandlerResult {
    ctx.reply.put_gameplay(&ExShowSeedSetting {
        manor_id: 1,
        seeds: Vec::new(),
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn procure_crop_list(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestProcureCropList = ctx.decode()?;

    ctx.reply.put_gameplay(&ExShowCropInfo {
        manor_id: pkt.manor_id,
        crops: Vec::new(),
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn set_seed(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestSetSeed = ctx.decode()?;
    debug!(manor_id = pkt.manor_id, seeds = pkt.seeds.len(), "seed setting ignored, no manor engine");
    Ok(PostAction::KeepOpen)
}

pub async fn set_crop(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestSetCrop = ctx.decode()?;
    debug!(manor_id = pkt.manor_id, crops = pkt.crops.len(), "crop setting ignored, no manor engine");
    Ok(PostAction::KeepOpen)
}

pub async fn ssq_status(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestSsqStatus = ctx.decode()?;

    ctx.reply.put_gameplay(&SsqStatus {
        page: pkt.page,
        period: 0,
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn confirm_target_item(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestConfirmTargetItem = ctx.decode()?;
    let player = ctx.player()?;

    if player.find_item(ObjectId(pkt.object_id as u32)).is_none() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    ctx.reply.put_gameplay(&ExPutItemResultForVariationMake {
        item_id: pkt.object_id,
        accepted: 1,
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn confirm_refiner_item(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestConfirmRefinerItem = ctx.decode()?;
    let player = ctx.player()?;

    if player.find_item(ObjectId(pkt.refiner_id as u32)).is_none() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    ctx.reply.put_gameplay(&ExPutItemResultForVariationMake {
        item_id: pkt.refiner_id,
        accepted: 1,
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn confirm_gem_stone(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestConfirmGemStone = ctx.decode()?;
    let player = ctx.player()?;

    let enough_gems = player
        .find_item(ObjectId(pkt.gemstone_id as u32))
        .is_some_and(|item| item.count >= pkt.gemstone_count);

    if !enough_gems {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    ctx.reply.put_gameplay(&ExPutItemResultForVariationMake {
        item_id: pkt.gemstone_id,
        accepted: 1,
    })?;

    Ok(PostAction::KeepOpen)
}

pub async fn refine(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestRefine = ctx.decode()?;
    let player = ctx.player()?;

    let have_all = player.find_item(ObjectId(pkt.target_id as u32)).is_some()
        && player.find_item(ObjectId(pkt.refiner_id as u32)).is_some();

    // Stat rolls belong to the augmentation engine; without it the
    // attempt resolves as a failure the client can recover from.
    ctx.reply.put_gameplay(&ExVariationResult {
        stat1: 0,
        stat2: 0,
        success: 0,
    })?;

    if !have_all {
        ctx.reply.put_gameplay(&ActionFailed {})?;
    }

    Ok(PostAction::KeepOpen)
}

pub async fn refine_cancel(ctx: DispatchCtx<'_>) -> HandlerResult {
    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

pub async fn henna_action(ctx: DispatchCtx<'_>) -> HandlerResult {
    // Symbol templates live in static data the core does not load.
    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}

pub async fn recipe_shop_message_set(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestRecipeShopMessageSet = ctx.decode()?;
    debug!(message = %pkt.message, "recipe shop message noted");
    Ok(PostAction::KeepOpen)
}

pub async fn recipe_shop_list_set(ctx: DispatchCtx<'_>) -> HandlerResult {
    let pkt: RequestRecipeShopListSet = ctx.decode()?;
    let player = ctx.player()?;

    if pkt.recipes.is_empty() {
        ctx.reply.put_gameplay(&ActionFailed {})?;
        return Ok(PostAction::KeepOpen);
    }

    // Opening the shop flips the private-store marker; everyone nearby
    // learns about it through the refreshed self-description.
    player.set_private_store(PrivateStore::Manufacture);
    ctx.reply.put_gameplay(&user_info(&player))?;

    Ok(PostAction::KeepOpen)
}

pub async fn recipe_shop_manage_quit(ctx: DispatchCtx<'_>) -> HandlerResult {
    let player = ctx.player()?;

    player.set_private_store(PrivateStore::None);
    ctx.reply.put_gameplay(&user_info(&player))?;

    Ok(PostAction::KeepOpen)
}

pub async fn recipe_shop_make(ctx: DispatchCtx<'_>) -> HandlerResult {
    // Crafting is a gameplay rule; refuse and keep the client usable.
    ctx.reply.put_gameplay(&ActionFailed {})?;
    Ok(PostAction::KeepOpen)
}
