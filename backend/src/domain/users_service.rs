//! User CRUD service.
//!
//! Coordinates the repository, password hashing and the cached user list.
//! The list is cached for ten minutes and dropped after every successful
//! mutation; cache failures are logged and never fail the request. Argon2
//! runs on tokio's blocking pool so request workers keep serving.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::password::hash_password;
use crate::domain::ports::{Cache, CacheTtl, UserRepository, get_json, set_json};
use crate::domain::{Failure, NewUser, User, UserChanges, UserDraft, UserId, UserPatch};

/// Cache key holding the serialized user list.
pub const USERS_INDEX_KEY: &str = "users:index";

/// Message returned when an identifier matches no user.
pub const USER_NOT_FOUND: &str = "Usuario no encontrado";

/// Driving service for the `/api/users` resource.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn Cache>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, cache: Arc<dyn Cache>) -> Self {
        Self { users, cache }
    }

    /// All users, served from the cache when a fresh copy exists.
    pub async fn index(&self) -> Result<Vec<User>, Failure> {
        if let Some(users) = get_json::<Vec<User>>(self.cache.as_ref(), USERS_INDEX_KEY).await {
            return Ok(users);
        }
        let users = self.users.list().await?;
        if let Err(error) = set_json(
            self.cache.as_ref(),
            USERS_INDEX_KEY,
            &users,
            CacheTtl::Minutes10,
        )
        .await
        {
            warn!(%error, "failed to cache user list");
        }
        Ok(users)
    }

    pub async fn show(&self, id: UserId) -> Result<User, Failure> {
        self.users
            .find(id)
            .await?
            .ok_or_else(|| Failure::not_found(USER_NOT_FOUND))
    }

    /// Hash the password and insert the user.
    pub async fn store(&self, draft: UserDraft) -> Result<User, Failure> {
        let UserDraft {
            name,
            lastname,
            age,
            email,
            password,
            address,
            gender,
            date,
            active,
        } = draft;
        let password_hash = hash(password).await?;
        let user = self
            .users
            .insert(NewUser {
                name,
                lastname,
                age,
                email,
                password_hash,
                address,
                gender,
                date,
                active,
            })
            .await?;
        debug!(user_id = %user.id, "user created");
        self.invalidate_index().await;
        Ok(user)
    }

    /// Apply `changes`; a new password is re-hashed.
    pub async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, Failure> {
        let UserChanges {
            name,
            lastname,
            age,
            email,
            password,
            address,
            gender,
            date,
            active,
        } = changes;
        let password_hash = match password {
            Some(password) => Some(hash(password).await?),
            None => None,
        };
        let patch = UserPatch {
            name,
            lastname,
            age,
            email,
            password_hash,
            address,
            gender,
            date,
            active,
        };
        let user = self
            .users
            .update(id, patch)
            .await?
            .ok_or_else(|| Failure::not_found(USER_NOT_FOUND))?;
        debug!(user_id = %id, "user updated");
        self.invalidate_index().await;
        Ok(user)
    }

    pub async fn destroy(&self, id: UserId) -> Result<(), Failure> {
        if !self.users.delete(id).await? {
            return Err(Failure::not_found(USER_NOT_FOUND));
        }
        debug!(user_id = %id, "user deleted");
        self.invalidate_index().await;
        Ok(())
    }

    async fn invalidate_index(&self) {
        if let Err(error) = self.cache.remove(USERS_INDEX_KEY).await {
            warn!(%error, "failed to invalidate cached user list");
        }
    }
}

async fn hash(password: String) -> Result<String, Failure> {
    run_blocking(move || hash_password(&password))
        .await?
        .map_err(|error| Failure::internal(error.to_string()))
}

/// Run CPU-bound work off the async worker; a panicked task is internal.
async fn run_blocking<T, F>(work: F) -> Result<T, Failure>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|error| Failure::internal(format!("blocking task failed: {error}")))
}

#[cfg(test)]
#[path = "users_service_tests.rs"]
mod tests;
