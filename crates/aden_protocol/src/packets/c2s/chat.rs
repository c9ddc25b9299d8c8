use std::io::Write;

use anyhow::bail;

use crate::packets::packet;
use crate::{op, Decode, Encode, Packet, PacketId};

/// Chat channel discriminators carried by [`Say`].
pub mod channel {
    pub const ALL: i32 = 0;
    pub const SHOUT: i32 = 1;
    pub const TELL: i32 = 2;
    pub const PARTY: i32 = 3;
    pub const CLAN: i32 = 4;
}

/// General chat. Whispers carry the recipient name after the channel
/// discriminator; every other channel omits it.
#[derive(Clone, PartialEq, Debug)]
pub struct Say {
    pub text: String,
    pub channel: i32,
    pub target: Option<String>,
}

impl Packet for Say {
    const ID: PacketId = PacketId::Simple(op::c2s::SAY);
    const NAME: &'static str = "Say";
}

impl Encode for Say {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        self.text.encode(&mut w)?;
        self.channel.encode(&mut w)?;

        match (&self.target, self.channel) {
            (Some(target), channel::TELL) => target.encode(&mut w),
            (None, channel::TELL) => bail!("whisper without a target"),
            (None, _) => Ok(()),
            (Some(_), _) => bail!("target on a non-whisper channel"),
        }
    }
}

impl Decode<'_> for Say {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        let text = String::decode(r)?;
        let channel = i32::decode(r)?;

        let target = if channel == channel::TELL {
            Some(String::decode(r)?)
        } else {
            None
        };

        Ok(Self {
            text,
            channel,
            target,
        })
    }
}

packet! {
    /// NPC dialog hyperlink follow-up.
    RequestBypassToServer(PacketId::Simple(op::c2s::REQUEST_BYPASS_TO_SERVER)) {
        command: String,
    }
}

packet! {
    /// GM console command. Gated on access level by the handler.
    SendBypassBuildCmd(PacketId::Simple(op::c2s::SEND_BYPASS_BUILD_CMD)) {
        command: String,
    }
}

packet! {
    RequestShowBoard(PacketId::Simple(op::c2s::REQUEST_SHOW_BOARD)) {
        flag: i32,
    }
}

packet! {
    RequestBbsWrite(PacketId::Simple(op::c2s::REQUEST_BBS_WRITE)) {
        path: String,
        args: String,
    }
}
