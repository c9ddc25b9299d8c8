use std::io::Write;

use anyhow::bail;

use crate::packets::packet;
use crate::{op, Decode, Encode, Packet, PacketId};

packet! {
    /// The universal "request refused, stay open" reply.
    ActionFailed(PacketId::Simple(op::s2c::ACTION_FAILED)) {}
}

/// A handful of the system message ids the core itself emits.
pub mod sm {
    pub const TARGET_LOST: i32 = 50;
    pub const TARGET_OUT_OF_RANGE: i32 = 22;
    pub const ALREADY_IN_PARTY: i32 = 160;
    pub const PARTY_FULL: i32 = 155;
    pub const HAS_JOINED_THE_PARTY: i32 = 110;
    pub const PLAYER_DECLINED: i32 = 158;
    pub const YOU_LEFT_THE_PARTY: i32 = 200;
    pub const PLAYER_LEFT_THE_PARTY: i32 = 201;
    pub const DISMISSED_FROM_THE_PARTY: i32 = 163;
    pub const PARTY_DISPERSED: i32 = 203;
    pub const TARGET_IS_NOT_FOUND_IN_THE_GAME: i32 = 145;
    pub const ONLY_THE_LEADER_CAN_GIVE_OUT_INVITATIONS: i32 = 154;
    pub const WAITING_FOR_ANOTHER_REPLY: i32 = 164;
    pub const NOT_IN_PARTY: i32 = 425;
}

/// Parameter slots of a [`SystemMessage`], in client display order.
#[derive(Clone, PartialEq, Debug)]
pub enum SmParam {
    Text(String),
    Number(i32),
    NpcName(i32),
    ItemName(i32),
}

const SM_TEXT: i32 = 0;
const SM_NUMBER: i32 = 1;
const SM_NPC_NAME: i32 = 2;
const SM_ITEM_NAME: i32 = 3;

impl Encode for SmParam {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        match self {
            SmParam::Text(text) => {
                SM_TEXT.encode(&mut w)?;
                text.encode(&mut w)
            }
            SmParam::Number(n) => {
                SM_NUMBER.encode(&mut w)?;
                n.encode(&mut w)
            }
            SmParam::NpcName(id) => {
                SM_NPC_NAME.encode(&mut w)?;
                id.encode(&mut w)
            }
            SmParam::ItemName(id) => {
                SM_ITEM_NAME.encode(&mut w)?;
                id.encode(&mut w)
            }
        }
    }
}

impl Decode<'_> for SmParam {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(match i32::decode(r)? {
            SM_TEXT => SmParam::Text(String::decode(r)?),
            SM_NUMBER => SmParam::Number(i32::decode(r)?),
            SM_NPC_NAME => SmParam::NpcName(i32::decode(r)?),
            SM_ITEM_NAME => SmParam::ItemName(i32::decode(r)?),
            kind => bail!("unknown system message parameter kind {kind}"),
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct SystemMessage {
    pub message_id: i32,
    pub params: Vec<SmParam>,
}

impl SystemMessage {
    /// A message with no parameter slots.
    pub fn plain(message_id: i32) -> Self {
        Self {
            message_id,
            params: Vec::new(),
        }
    }
}

impl Packet for SystemMessage {
    const ID: PacketId = PacketId::Simple(op::s2c::SYSTEM_MESSAGE);
    const NAME: &'static str = "SystemMessage";
}

impl Encode for SystemMessage {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        self.message_id.encode(&mut w)?;
        self.params.encode(&mut w)
    }
}

impl Decode<'_> for SystemMessage {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            message_id: i32::decode(r)?,
            params: Vec::decode(r)?,
        })
    }
}

packet! {
    GmList(PacketId::Simple(op::s2c::GM_LIST)) {
        names: Vec<String>,
    }
}

packet! {
    L2FriendSay(PacketId::Simple(op::s2c::L2_FRIEND_SAY)) {
        from: String,
        to: String,
        text: String,
    }
}
