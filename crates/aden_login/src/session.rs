//! The process-wide session-key store.
//!
//! The login server mints a key when an account authenticates; the game
//! server consumes it exactly once while validating `AuthLogin`. The two
//! endpoints share one registry instance when embedded in a single
//! process, which is the deployment this repo ships.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use thiserror::Error;

use aden_protocol::SessionKey;

use crate::table::ControlFail;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no session key stored for the account")]
    Unknown,
    #[error("session key fields do not match")]
    Mismatch,
}

#[derive(Default)]
struct SessionInner {
    keys: HashMap<String, SessionKey>,
    in_game: HashSet<String>,
}

#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<SessionInner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a key for an account that just authenticated against the
    /// login server. Refused while the account is attached to a game
    /// server.
    pub fn store(&self, account: &str, key: SessionKey) -> Result<(), ControlFail> {
        let mut inner = self.inner.write();

        if inner.in_game.contains(account) {
            return Err(ControlFail::AlreadyLoggedIn);
        }

        inner.keys.insert(account.to_owned(), key);
        Ok(())
    }

    /// Compares all four fields exactly and consumes the key on success;
    /// a second validation with the same key fails with `Unknown`.
    pub fn validate_and_consume(
        &self,
        account: &str,
        presented: SessionKey,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.write();

        let stored = *inner.keys.get(account).ok_or(SessionError::Unknown)?;

        if stored != presented {
            return Err(SessionError::Mismatch);
        }

        inner.keys.remove(account);
        Ok(())
    }

    pub fn discard(&self, account: &str) {
        self.inner.write().keys.remove(account);
    }

    pub fn mark_in_game(&self, account: &str) {
        self.inner.write().in_game.insert(account.to_owned());
    }

    pub fn mark_logout(&self, account: &str) {
        self.inner.write().in_game.remove(account);
    }

    pub fn is_in_game(&self, account: &str) -> bool {
        self.inner.read().in_game.contains(account)
    }

    pub fn pending_keys(&self) -> usize {
        self.inner.read().keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: SessionKey = SessionKey::new(0x12345678, -0x65432110, 0x11111111, 0x22222222);

    #[test]
    fn keys_are_single_use() {
        let sessions = SessionRegistry::new();
        sessions.store("acct1", KEY).unwrap();

        assert_eq!(sessions.validate_and_consume("acct1", KEY), Ok(()));
        assert_eq!(
            sessions.validate_and_consume("acct1", KEY),
            Err(SessionError::Unknown)
        );
    }

    #[test]
    fn one_differing_field_is_a_mismatch() {
        let sessions = SessionRegistry::new();
        sessions.store("acct1", KEY).unwrap();

        let mut wrong = KEY;
        wrong.login_ok2 = 0;

        assert_eq!(
            sessions.validate_and_consume("acct1", wrong),
            Err(SessionError::Mismatch)
        );

        // The mismatch did not burn the stored key.
        assert_eq!(sessions.validate_and_consume("acct1", KEY), Ok(()));
    }

    #[test]
    fn in_game_accounts_cannot_mint_new_keys() {
        let sessions = SessionRegistry::new();
        sessions.mark_in_game("acct1");

        assert_eq!(
            sessions.store("acct1", KEY),
            Err(ControlFail::AlreadyLoggedIn)
        );

        sessions.mark_logout("acct1");
        assert!(sessions.store("acct1", KEY).is_ok());
    }
}
