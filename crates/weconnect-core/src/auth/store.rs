use std::fmt;
use std::sync::RwLock;

/// Opaque bearer token proving an authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Single slot holding at most one credential.
///
/// Absence is the only logged-out signal; there is no expiry timer.
/// Implementations must make `set` and `clear` atomic with respect to `get`.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<Credential>;

    /// Store `credential`, replacing any previous value.
    fn set(&self, credential: Credential);

    /// Remove the credential. Clearing an empty store is a no-op.
    fn clear(&self);

    /// Remove the credential only if it is still `expected`.
    ///
    /// The comparison and the removal happen under one write, so a newer
    /// credential stored in between is left alone. Returns whether it cleared.
    fn clear_if(&self, expected: &Credential) -> bool;

    fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

/// Process-local store with no persistence.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: impl Into<Credential>) -> Self {
        Self {
            slot: RwLock::new(Some(credential.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<Credential> {
        read_slot(&self.slot)
    }

    fn set(&self, credential: Credential) {
        write_slot(&self.slot, Some(credential));
    }

    fn clear(&self) {
        write_slot(&self.slot, None);
    }

    fn clear_if(&self, expected: &Credential) -> bool {
        take_slot_if(&self.slot, |held| held == expected)
    }
}

// A poisoned lock still holds a complete value since writes are single assignments.
pub(crate) fn read_slot<T: Clone>(slot: &RwLock<Option<T>>) -> Option<T> {
    match slot.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub(crate) fn write_slot<T>(slot: &RwLock<Option<T>>, value: Option<T>) {
    match slot.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

/// Empty the slot when `matches` accepts its value, under a single write lock.
pub(crate) fn take_slot_if<T>(slot: &RwLock<Option<T>>, matches: impl FnOnce(&T) -> bool) -> bool {
    let mut guard = match slot.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if guard.as_ref().is_some_and(matches) {
        *guard = None;
        true
    } else {
        false
    }
}
