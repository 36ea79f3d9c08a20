//! Session storage.
//!
//! This module provides:
//! - `TokenStore`: the single-slot credential interface every request reads
//! - `MemoryTokenStore`: in-process store, used by tests and one-shot tools
//! - `FileTokenStore`: `session.json` in the data directory
//! - `KeyringTokenStore`: OS-level storage via keyring

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::KeyringTokenStore;
pub use session::{FileTokenStore, SessionData};
pub use store::{Credential, MemoryTokenStore, TokenStore};
