//! Item workshops: augmentation, recipe shops, henna, soulshots, skill
//! enchanting, manor administration, Seven Signs status.

use crate::packets::{packet, wire_struct};
use crate::{op, PacketId, EXT_C2S_PREFIX};

packet! {
    RequestConfirmTargetItem(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_CONFIRM_TARGET_ITEM)) {
        object_id: i32,
    }
}

packet! {
    RequestConfirmRefinerItem(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_CONFIRM_REFINER_ITEM)) {
        target_id: i32,
        refiner_id: i32,
    }
}

packet! {
    RequestConfirmGemStone(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_CONFIRM_GEM_STONE)) {
        target_id: i32,
        refiner_id: i32,
        gemstone_id: i32,
        gemstone_count: i32,
    }
}

packet! {
    RequestRefine(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_REFINE)) {
        target_id: i32,
        refiner_id: i32,
        gemstone_id: i32,
        gemstone_count: i32,
    }
}

packet! {
    RequestRefineCancel(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_REFINE_CANCEL)) {
        target_id: i32,
    }
}

packet! {
    RequestRecipeShopMessageSet(PacketId::Simple(op::c2s::REQUEST_RECIPE_SHOP_MESSAGE_SET)) {
        message: String,
    }
}

wire_struct! {
    RecipeShopEntry {
        recipe_id: i32,
        price: i32,
    }
}

packet! {
    RequestRecipeShopListSet(PacketId::Simple(op::c2s::REQUEST_RECIPE_SHOP_LIST_SET)) {
        recipes: Vec<RecipeShopEntry>,
    }
}

packet! {
    RequestRecipeShopManageQuit(PacketId::Simple(op::c2s::REQUEST_RECIPE_SHOP_MANAGE_QUIT)) {}
}

packet! {
    RequestRecipeShopManagePrev(PacketId::Simple(op::c2s::REQUEST_RECIPE_SHOP_MANAGE_PREV)) {}
}

packet! {
    RequestRecipeShopMakeInfo(PacketId::Simple(op::c2s::REQUEST_RECIPE_SHOP_MAKE_INFO)) {
        shop_id: i32,
        recipe_id: i32,
    }
}

packet! {
    RequestRecipeShopMakeItem(PacketId::Simple(op::c2s::REQUEST_RECIPE_SHOP_MAKE_ITEM)) {
        shop_id: i32,
        recipe_id: i32,
    }
}

packet! {
    RequestHennaEquip(PacketId::Simple(op::c2s::REQUEST_HENNA_EQUIP)) {
        symbol_id: i32,
    }
}

packet! {
    RequestHennaRemove(PacketId::Simple(op::c2s::REQUEST_HENNA_REMOVE)) {
        symbol_id: i32,
    }
}

packet! {
    RequestAutoSoulShot(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_AUTO_SOUL_SHOT)) {
        item_id: i32,
        enable: i32,
    }
}

packet! {
    RequestExEnchantSkillInfo(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_EX_ENCHANT_SKILL_INFO)) {
        skill_id: i32,
        level: i32,
    }
}

packet! {
    RequestExEnchantSkill(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_EX_ENCHANT_SKILL)) {
        skill_id: i32,
        level: i32,
    }
}

packet! {
    RequestManorList(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_MANOR_LIST)) {}
}

packet! {
    RequestProcureCropList(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_PROCURE_CROP_LIST)) {
        manor_id: i32,
    }
}

wire_struct! {
    SeedSetting {
        seed_id: i32,
        amount: i32,
    }
}

packet! {
    RequestSetSeed(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_SET_SEED)) {
        manor_id: i32,
        seeds: Vec<SeedSetting>,
    }
}

wire_struct! {
    CropSetting {
        crop_id: i32,
        amount: i32,
        price: i32,
    }
}

packet! {
    RequestSetCrop(PacketId::Ext(EXT_C2S_PREFIX, op::c2s::ex::REQUEST_SET_CROP)) {
        manor_id: i32,
        crops: Vec<CropSetting>,
    }
}

packet! {
    RequestSsqStatus(PacketId::Simple(op::c2s::REQUEST_SSQ_STATUS)) {
        page: u8,
    }
}
