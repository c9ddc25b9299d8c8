use std::fmt;
use std::io::Write;

use crate::{Decode, Encode};

/// The four-int32 credential minted by the login server and presented by
/// the game client during `AuthLogin`. The pair of servers must observe
/// byte-equal values; comparison is exact on all four fields.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct SessionKey {
    pub play_ok1: i32,
    pub play_ok2: i32,
    pub login_ok1: i32,
    pub login_ok2: i32,
}

impl SessionKey {
    pub const fn new(play_ok1: i32, play_ok2: i32, login_ok1: i32, login_ok2: i32) -> Self {
        Self {
            play_ok1,
            play_ok2,
            login_ok1,
            login_ok2,
        }
    }
}

impl fmt::Debug for SessionKey {
    // Session keys are credentials; keep them out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

impl Encode for SessionKey {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        self.play_ok1.encode(&mut w)?;
        self.play_ok2.encode(&mut w)?;
        self.login_ok1.encode(&mut w)?;
        self.login_ok2.encode(&mut w)
    }
}

impl Decode<'_> for SessionKey {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            play_ok1: i32::decode(r)?,
            play_ok2: i32::decode(r)?,
            login_ok1: i32::decode(r)?,
            login_ok2: i32::decode(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_is_exact_on_all_fields() {
        let key = SessionKey::new(0x12345678, -0x65432110, 0x11111111, 0x22222222);

        assert_eq!(key, SessionKey::new(0x12345678, -0x65432110, 0x11111111, 0x22222222));

        for differing in [
            SessionKey::new(0, -0x65432110, 0x11111111, 0x22222222),
            SessionKey::new(0x12345678, 0, 0x11111111, 0x22222222),
            SessionKey::new(0x12345678, -0x65432110, 0, 0x22222222),
            SessionKey::new(0x12345678, -0x65432110, 0x11111111, 0),
        ] {
            assert_ne!(key, differing);
        }
    }

    #[test]
    fn wire_round_trip() {
        let key = SessionKey::new(1, 2, 3, 4);

        let mut buf = Vec::new();
        key.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), 16);

        let mut r = &buf[..];
        assert_eq!(SessionKey::decode(&mut r).unwrap(), key);
    }
}
