//! Manor administration and augmentation results.

use crate::packets::{packet, wire_struct};
use crate::{op, PacketId, EXT_S2C_PREFIX};

wire_struct! {
    SeedInfo {
        seed_id: i32,
        left: i32,
        price: i32,
        sales_limit: i32,
    }
}

packet! {
    ExShowSeedInfo(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_SHOW_SEED_INFO)) {
        manor_id: i32,
        seeds: Vec<SeedInfo>,
    }
}

wire_struct! {
    CropInfo {
        crop_id: i32,
        left: i32,
        price: i32,
        reward_kind: i32,
    }
}

packet! {
    ExShowCropInfo(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_SHOW_CROP_INFO)) {
        manor_id: i32,
        crops: Vec<CropInfo>,
    }
}

packet! {
    ExShowSeedSetting(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_SHOW_SEED_SETTING)) {
        manor_id: i32,
        seeds: Vec<SeedInfo>,
    }
}

packet! {
    ExShowCropSetting(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_SHOW_CROP_SETTING)) {
        manor_id: i32,
        crops: Vec<CropInfo>,
    }
}

packet! {
    /// Outcome of an augmentation attempt.
    ExVariationResult(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_VARIATION_RESULT)) {
        stat1: i32,
        stat2: i32,
        success: i32,
    }
}

packet! {
    ExPutItemResultForVariationMake(PacketId::Ext(EXT_S2C_PREFIX, op::s2c::ex::EX_PUT_ITEM_RESULT_FOR_VARIATION_MAKE)) {
        item_id: i32,
        accepted: i32,
    }
}
