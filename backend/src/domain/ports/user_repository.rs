//! Port abstraction for user persistence adapters.
//!
//! Adapters report every storage problem as a [`Failure`] so the HTTP layer
//! can classify it without knowing which backend is in use.
use async_trait::async_trait;

use crate::domain::{Failure, NewUser, User, UserId, UserPatch};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users ordered by identifier.
    async fn list(&self) -> Result<Vec<User>, Failure>;

    /// User with `id`, if present.
    async fn find(&self, id: UserId) -> Result<Option<User>, Failure>;

    /// Insert a user and return the stored record.
    async fn insert(&self, user: NewUser) -> Result<User, Failure>;

    /// Apply `patch` to the user with `id`; `None` when no such user exists.
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>, Failure>;

    /// Delete the user with `id`; `false` when no such user exists.
    async fn delete(&self, id: UserId) -> Result<bool, Failure>;
}
