use std::sync::RwLock;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::{debug, warn};

use super::store::{read_slot, take_slot_if, write_slot, Credential, TokenStore};

const SERVICE_NAME: &str = "weconnect";

/// Keyring account under which the session token is kept
const SESSION_ACCOUNT: &str = "session";

/// Token store backed by the OS keychain.
pub struct KeyringTokenStore {
    entry: Entry,
    slot: RwLock<Option<Credential>>,
}

impl KeyringTokenStore {
    pub fn open() -> Result<Self> {
        let entry = Entry::new(SERVICE_NAME, SESSION_ACCOUNT)
            .context("Failed to create keyring entry")?;
        let slot = match entry.get_password() {
            Ok(token) => Some(Credential::new(token)),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read session from keychain");
                None
            }
        };
        debug!(has_session = slot.is_some(), "Keyring session store opened");
        Ok(Self {
            entry,
            slot: RwLock::new(slot),
        })
    }

    fn delete_entry(&self) {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => warn!(error = %e, "Failed to delete session from keychain"),
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Option<Credential> {
        read_slot(&self.slot)
    }

    fn set(&self, credential: Credential) {
        if let Err(e) = self.entry.set_password(credential.as_str()) {
            warn!(error = %e, "Failed to store session in keychain");
        }
        write_slot(&self.slot, Some(credential));
    }

    fn clear(&self) {
        write_slot(&self.slot, None);
        self.delete_entry();
    }

    fn clear_if(&self, expected: &Credential) -> bool {
        let cleared = take_slot_if(&self.slot, |held| held == expected);
        if cleared {
            self.delete_entry();
        }
        cleared
    }
}
