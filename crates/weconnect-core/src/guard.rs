//! Route guard deciding whether protected surfaces may render.
//!
//! A guard starts `Unknown`, consults the token store once per activation,
//! and settles on `Authorized` or `Unauthorized`. It never touches the
//! network, so it cannot notice a credential the backend has since revoked;
//! that case surfaces as `ApiError::Unauthorized` from the next request,
//! which also clears the store.

use std::sync::Arc;

use tracing::debug;

use crate::auth::TokenStore;

/// Route of the login surface unauthenticated users are sent to.
pub const ENTRY_ROUTE: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unknown,
    Authorized,
    Unauthorized,
}

/// Result of gating protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    Render(T),
    Redirect(String),
}

impl<T> Gate<T> {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Gate::Redirect(_))
    }

    pub fn rendered(self) -> Option<T> {
        match self {
            Gate::Render(content) => Some(content),
            Gate::Redirect(_) => None,
        }
    }
}

pub struct RouteGuard {
    store: Arc<dyn TokenStore>,
    state: GuardState,
    entry_route: String,
}

impl RouteGuard {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            state: GuardState::Unknown,
            entry_route: ENTRY_ROUTE.to_string(),
        }
    }

    pub fn with_entry_route(mut self, route: impl Into<String>) -> Self {
        self.entry_route = route.into();
        self
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn entry_route(&self) -> &str {
        &self.entry_route
    }

    /// Settle the guard. Only the first call of an activation reads the store.
    pub fn check(&mut self) -> GuardState {
        if self.state == GuardState::Unknown {
            self.state = if self.store.is_present() {
                GuardState::Authorized
            } else {
                GuardState::Unauthorized
            };
            debug!(state = ?self.state, "Route guard resolved");
        }
        self.state
    }

    /// Render `content` if authorized, otherwise redirect without evaluating it.
    pub fn gate<T>(&mut self, content: impl FnOnce() -> T) -> Gate<T> {
        match self.check() {
            GuardState::Authorized => Gate::Render(content()),
            _ => Gate::Redirect(self.entry_route.clone()),
        }
    }

    /// Start a new activation; the next `check` reads the store again.
    pub fn reset(&mut self) {
        self.state = GuardState::Unknown;
    }
}
