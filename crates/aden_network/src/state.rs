/// Connection lifecycle. Transitions only move rightwards; DISCONNECTED
/// is terminal.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum ConnState {
    /// Fresh TCP accept; only ProtocolVersion is legal.
    Connected = 0,
    /// Session key checked out; character selection is available.
    Authenticated = 1,
    /// A character was picked; waiting for EnterWorld.
    Entering = 2,
    /// Spawned into the world; the full gameplay opcode set is legal.
    InGame = 3,
    /// Terminal.
    Disconnected = 4,
}

impl ConnState {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnState::Connected,
            1 => ConnState::Authenticated,
            2 => ConnState::Entering,
            3 => ConnState::InGame,
            _ => ConnState::Disconnected,
        }
    }

    /// Whether broadcast fan-out may target this connection at all.
    pub fn at_least_authenticated(self) -> bool {
        matches!(
            self,
            ConnState::Authenticated | ConnState::Entering | ConnState::InGame
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u8() {
        for state in [
            ConnState::Connected,
            ConnState::Authenticated,
            ConnState::Entering,
            ConnState::InGame,
            ConnState::Disconnected,
        ] {
            assert_eq!(ConnState::from_u8(state as u8), state);
        }
    }
}
