//! The packet catalogue, grouped by direction and family.
//!
//! Payload layouts follow the Interlude client. Packets that are pure
//! field sequences are declared through the [`packet!`] macro; anything
//! with a conditional or counted layout writes its impls by hand.

pub mod c2s;
pub mod s2c;

/// Declares a packet struct and derives its `Packet`, `Encode` and
/// `Decode` implementations from a flat field list.
#[macro_export]
macro_rules! packet {
    (
        $(#[$attr:meta])*
        $name:ident ( $id:expr ) {
            $( $(#[$fattr:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Debug)]
        pub struct $name {
            $( $(#[$fattr])* pub $field: $ty, )*
        }

        impl $crate::Packet for $name {
            const ID: $crate::PacketId = $id;
            const NAME: &'static str = stringify!($name);
        }

        impl $crate::Encode for $name {
            #[allow(unused_variables, unused_mut)]
            fn encode(&self, mut w: impl ::std::io::Write) -> ::anyhow::Result<()> {
                $( $crate::Encode::encode(&self.$field, &mut w)?; )*
                Ok(())
            }
        }

        impl<'a> $crate::Decode<'a> for $name {
            #[allow(unused_variables)]
            fn decode(r: &mut &'a [u8]) -> ::anyhow::Result<Self> {
                Ok(Self {
                    $( $field: <$ty as $crate::Decode>::decode(r)?, )*
                })
            }
        }
    };
}

/// Like [`packet!`] but for nested wire structs that are not packets of
/// their own.
#[macro_export]
macro_rules! wire_struct {
    (
        $(#[$attr:meta])*
        $name:ident {
            $( $(#[$fattr:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Debug)]
        pub struct $name {
            $( $(#[$fattr])* pub $field: $ty, )*
        }

        impl $crate::Encode for $name {
            #[allow(unused_variables, unused_mut)]
            fn encode(&self, mut w: impl ::std::io::Write) -> ::anyhow::Result<()> {
                $( $crate::Encode::encode(&self.$field, &mut w)?; )*
                Ok(())
            }
        }

        impl<'a> $crate::Decode<'a> for $name {
            #[allow(unused_variables)]
            fn decode(r: &mut &'a [u8]) -> ::anyhow::Result<Self> {
                Ok(Self {
                    $( $field: <$ty as $crate::Decode>::decode(r)?, )*
                })
            }
        }
    };
}

pub(crate) use crate::{packet, wire_struct};

#[cfg(test)]
mod tests {
    use crate::packets::c2s::{AuthLogin, Say};
    use crate::packets::s2c::{CharSelectEntry, CharSelectionInfo, SystemMessage};
    use crate::{Decode, Encode, Packet, PacketId, SessionKey};

    #[test]
    fn flat_packet_round_trip() {
        let pkt = AuthLogin {
            account: "midnight".into(),
            keys: SessionKey::new(1, -2, 3, -4),
        };

        let mut buf = Vec::new();
        pkt.encode_with_id(&mut buf).unwrap();

        assert_eq!(buf[0], AuthLogin::ID.prefix());

        let mut r = &buf[1..];
        assert_eq!(AuthLogin::decode(&mut r).unwrap(), pkt);
        assert!(r.is_empty());
    }

    #[test]
    fn counted_layout_round_trip() {
        let pkt = CharSelectionInfo {
            chars: vec![
                CharSelectEntry {
                    name: "Fira".into(),
                    char_id: 0x1000_0001,
                    level: 52,
                    ..Default::default()
                },
                CharSelectEntry {
                    name: "Second".into(),
                    char_id: 0x1000_0002,
                    ..Default::default()
                },
            ],
        };

        let mut buf = Vec::new();
        pkt.encode(&mut buf).unwrap();

        let mut r = &buf[..];
        let back = CharSelectionInfo::decode(&mut r).unwrap();
        assert_eq!(back.chars.len(), 2);
        assert_eq!(back.chars[0].name, "Fira");
        assert_eq!(back.chars[1].char_id, 0x1000_0002);
    }

    #[test]
    fn conditional_layout_round_trip() {
        let whisper = Say {
            text: "psst".into(),
            channel: crate::packets::c2s::chat::channel::TELL,
            target: Some("Fira".into()),
        };

        let mut buf = Vec::new();
        whisper.encode(&mut buf).unwrap();

        let mut r = &buf[..];
        assert_eq!(Say::decode(&mut r).unwrap(), whisper);

        let shout = Say {
            text: "hey".into(),
            channel: crate::packets::c2s::chat::channel::SHOUT,
            target: None,
        };

        let mut buf = Vec::new();
        shout.encode(&mut buf).unwrap();

        let mut r = &buf[..];
        assert_eq!(Say::decode(&mut r).unwrap(), shout);
    }

    #[test]
    fn extended_packets_carry_the_prefix_and_subopcode() {
        use crate::packets::s2c::ExDuelReady;

        let pkt = ExDuelReady { party_duel: 1 };

        let mut buf = Vec::new();
        pkt.encode_with_id(&mut buf).unwrap();

        let PacketId::Ext(prefix, sub) = ExDuelReady::ID else {
            panic!("duel packets are extended");
        };

        assert_eq!(buf[0], prefix);
        assert_eq!(u16::from_le_bytes([buf[1], buf[2]]), sub);
    }

    #[test]
    fn system_message_params_round_trip() {
        use crate::packets::s2c::system::SmParam;

        let pkt = SystemMessage {
            message_id: 612,
            params: vec![SmParam::Text("Gatekeeper".into()), SmParam::Number(3)],
        };

        let mut buf = Vec::new();
        pkt.encode(&mut buf).unwrap();

        let mut r = &buf[..];
        assert_eq!(SystemMessage::decode(&mut r).unwrap(), pkt);
    }
}
