use crate::packets::packet;
use crate::{op, PacketId};

packet! {
    /// Request to move to a target point. The origin triple is what the
    /// client believes its current position to be.
    MoveToLocation(PacketId::Simple(op::c2s::MOVE_TO_LOCATION)) {
        tx: i32,
        ty: i32,
        tz: i32,
        ox: i32,
        oy: i32,
        oz: i32,
        /// 0 = keyboard, 1 = mouse.
        move_mode: i32,
    }
}

packet! {
    /// Periodic client-side position report, answered with a correction
    /// when the desync exceeds the threshold.
    ValidatePosition(PacketId::Simple(op::c2s::VALIDATE_POSITION)) {
        x: i32,
        y: i32,
        z: i32,
        heading: i32,
    }
}

packet! {
    /// Click on a world object: select it as the current target, or
    /// interact when already selected.
    Action(PacketId::Simple(op::c2s::ACTION)) {
        object_id: i32,
        origin_x: i32,
        origin_y: i32,
        origin_z: i32,
        /// 0 = plain click, 1 = shift-click.
        action_kind: u8,
    }
}

packet! {
    RequestTargetCancel(PacketId::Simple(op::c2s::REQUEST_TARGET_CANCEL)) {
        /// 0 = cancel cast only, 1 = clear the target.
        unselect: i16,
    }
}

packet! {
    UseItem(PacketId::Simple(op::c2s::USE_ITEM)) {
        object_id: i32,
        ctrl_pressed: i32,
    }
}

packet! {
    /// Pet/summon action bar use.
    RequestActionUse(PacketId::Simple(op::c2s::REQUEST_ACTION_USE)) {
        action_id: i32,
        ctrl_pressed: i32,
        shift_pressed: u8,
    }
}

packet! {
    RequestMagicSkillUse(PacketId::Simple(op::c2s::REQUEST_MAGIC_SKILL_USE)) {
        skill_id: i32,
        ctrl_pressed: i32,
        shift_pressed: u8,
    }
}

packet! {
    RequestSocialAction(PacketId::Simple(op::c2s::REQUEST_SOCIAL_ACTION)) {
        action: i32,
    }
}
