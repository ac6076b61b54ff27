//! In-process `UserRepository` used when no database is configured.
//!
//! Mirrors the database constraints the API depends on: emails are unique
//! and identifiers are assigned sequentially.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::UserRepository;
use crate::domain::{Failure, NewUser, User, UserId, UserPatch};

#[derive(Debug, Default)]
struct Store {
    next_id: i32,
    users: Vec<User>,
}

impl Store {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|user| Some(user.id) != except && user.email == email)
    }
}

/// Mutex-guarded user table.
pub struct InMemoryUserRepository {
    store: Mutex<Store>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryUserRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, Failure> {
        Ok(self.lock().users.clone())
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, Failure> {
        Ok(self.lock().users.iter().find(|user| user.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, Failure> {
        let mut store = self.lock();
        if store.email_taken(&user.email, None) {
            return Err(Failure::unique("email", user.email));
        }
        store.next_id = store
            .next_id
            .checked_add(1)
            .ok_or_else(|| Failure::database("user id sequence exhausted", None))?;
        let now = self.clock.utc();
        let NewUser {
            name,
            lastname,
            age,
            email,
            password_hash,
            address,
            gender,
            date,
            active,
        } = user;
        let stored = User {
            id: UserId::new(store.next_id),
            name,
            lastname,
            age,
            email,
            password_hash,
            address,
            gender,
            date,
            active,
            created_at: now,
            updated_at: now,
        };
        store.users.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>, Failure> {
        let mut store = self.lock();
        let Some(index) = store.users.iter().position(|user| user.id == id) else {
            return Ok(None);
        };
        if let Some(email) = patch.email.as_deref()
            && store.email_taken(email, Some(id))
        {
            return Err(Failure::unique("email", email));
        }
        let now = self.clock.utc();
        let Some(user) = store.users.get_mut(index) else {
            return Ok(None);
        };
        patch.apply_to(user);
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, Failure> {
        let mut store = self.lock();
        let before = store.users.len();
        store.users.retain(|user| user.id != id);
        Ok(store.users.len() != before)
    }
}
