//! Packets describing world-visible events around an observer.

use crate::packets::packet;
use crate::{op, PacketId};

packet! {
    /// A creature started moving; observers animate it from the origin
    /// towards the target.
    MoveToLocation(PacketId::Simple(op::s2c::MOVE_TO_LOCATION)) {
        object_id: i32,
        tx: i32,
        ty: i32,
        tz: i32,
        x: i32,
        y: i32,
        z: i32,
    }
}

packet! {
    StopMove(PacketId::Simple(op::s2c::STOP_MOVE)) {
        object_id: i32,
        x: i32,
        y: i32,
        z: i32,
        heading: i32,
    }
}

packet! {
    /// Position correction in response to a desynced ValidatePosition.
    ValidateLocation(PacketId::Simple(op::s2c::VALIDATE_LOCATION)) {
        object_id: i32,
        x: i32,
        y: i32,
        z: i32,
        heading: i32,
    }
}

packet! {
    TeleportToLocation(PacketId::Simple(op::s2c::TELEPORT_TO_LOCATION)) {
        object_id: i32,
        x: i32,
        y: i32,
        z: i32,
    }
}

packet! {
    /// The object left the observer's view entirely.
    DeleteObject(PacketId::Simple(op::s2c::DELETE_OBJECT)) {
        object_id: i32,
    }
}

packet! {
    SocialAction(PacketId::Simple(op::s2c::SOCIAL_ACTION)) {
        object_id: i32,
        action: i32,
    }
}

packet! {
    CreatureSay(PacketId::Simple(op::s2c::CREATURE_SAY)) {
        object_id: i32,
        channel: i32,
        name: String,
        text: String,
    }
}

packet! {
    PlaySound(PacketId::Simple(op::s2c::PLAY_SOUND)) {
        sound: String,
    }
}

packet! {
    NpcHtmlMessage(PacketId::Simple(op::s2c::NPC_HTML_MESSAGE)) {
        object_id: i32,
        html: String,
    }
}
