//! Client core for the WeConnect social network.
//!
//! The session lifecycle lives here: a single-slot `TokenStore`, an
//! `ApiClient` that reads it on every request, login/register/logout,
//! a `RouteGuard` for protected surfaces, and typed resource operations.
//! `Timeline` and `People` keep view state in step with the backend and
//! suppress duplicate submissions per target.

pub mod api;
pub mod auth;
pub mod config;
pub mod feed;
pub mod guard;
pub mod inflight;
pub mod models;
pub mod people;
pub mod utils;

pub use api::{ApiClient, ApiError, ConflictKind, ErrorKind};
pub use auth::{Credential, FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use config::{Config, TokenBackend};
pub use feed::{Outcome, Timeline};
pub use guard::{Gate, GuardState, RouteGuard};
pub use inflight::{Action, ActionKey, InFlight};
pub use people::People;
