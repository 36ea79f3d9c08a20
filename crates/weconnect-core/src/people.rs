//! Local people-directory state with guarded follow toggles.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::api::{ApiClient, ApiError, ConflictKind};
use crate::feed::Outcome;
use crate::inflight::{Action, ActionKey, InFlight};
use crate::models::UserSummary;

pub struct People {
    api: ApiClient,
    users: Mutex<Vec<UserSummary>>,
    inflight: InFlight,
}

impl People {
    pub fn new(api: ApiClient) -> Self {
        Self::with_users(api, Vec::new())
    }

    pub fn with_users(api: ApiClient, users: Vec<UserSummary>) -> Self {
        Self {
            api,
            users: Mutex::new(users),
            inflight: InFlight::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<UserSummary>> {
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn users(&self) -> Vec<UserSummary> {
        self.lock().clone()
    }

    pub fn user(&self, user_id: i64) -> Option<UserSummary> {
        self.lock().iter().find(|u| u.id == user_id).cloned()
    }

    fn update(&self, user_id: i64, f: impl FnOnce(&mut UserSummary)) {
        if let Some(user) = self.lock().iter_mut().find(|u| u.id == user_id) {
            f(user);
        }
    }

    pub async fn refresh(&self) -> Result<usize, ApiError> {
        let users = self.api.list_users().await?;
        let count = users.len();
        *self.lock() = users;
        Ok(count)
    }

    pub async fn follow(&self, user_id: i64) -> Result<Outcome, ApiError> {
        self.set_following(user_id, true).await
    }

    pub async fn unfollow(&self, user_id: i64) -> Result<Outcome, ApiError> {
        self.set_following(user_id, false).await
    }

    async fn set_following(&self, user_id: i64, following: bool) -> Result<Outcome, ApiError> {
        let Some(_ticket) = self.inflight.try_begin(ActionKey::new(Action::Follow, user_id)) else {
            return Ok(Outcome::Suppressed);
        };

        let result = if following {
            self.api.follow(user_id).await
        } else {
            self.api.unfollow(user_id).await
        };

        match result {
            Ok(()) => {
                self.update(user_id, |user| {
                    if following {
                        user.followers_count += 1;
                    } else {
                        user.followers_count = user.followers_count.saturating_sub(1);
                    }
                    user.is_following = following;
                });
                Ok(Outcome::Applied(()))
            }
            Err(e) => {
                match e.conflict_kind() {
                    Some(ConflictKind::AlreadyFollowing) => {
                        self.update(user_id, |user| user.is_following = true)
                    }
                    Some(ConflictKind::NotFollowing) => {
                        self.update(user_id, |user| user.is_following = false)
                    }
                    _ => {}
                }
                debug!(user_id, error = %e, "Follow change rejected");
                Err(e)
            }
        }
    }
}
