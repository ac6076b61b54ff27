//! User records and the commands that create or change them.
//!
//! JSON field names follow the public API (`genero`, `fecha`, `estado`,
//! `createdAt`); Rust field names describe what the value is.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Database identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = i32, example = 1)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw identifier.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Gender options accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculino,
    Femenino,
}

impl Gender {
    /// Allowed wire values.
    pub const VALUES: [&'static str; 2] = ["masculino", "femenino"];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Masculino => "masculino",
            Self::Femenino => "femenino",
        }
    }
}

/// Postal address stored with the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    #[schema(example = "Av. Arequipa 123")]
    pub street: String,
    #[schema(example = "Lima")]
    pub city: String,
    #[schema(example = "Lima")]
    pub state: String,
    #[schema(example = "15001")]
    pub zip: String,
}

/// Persisted user as returned by the API.
///
/// The password hash never leaves the process: it is skipped by serde, so a
/// user decoded from JSON (for example from the cache) carries an empty hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub lastname: String,
    pub age: i32,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub address: Address,
    #[serde(rename = "genero")]
    pub gender: Gender,
    #[serde(rename = "fecha")]
    pub date: DateTime<Utc>,
    #[serde(rename = "estado")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated create request, deserialized from the normalized payload.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct UserDraft {
    #[schema(example = "Ada")]
    pub name: String,
    #[schema(example = "Lovelace")]
    pub lastname: String,
    #[schema(example = 36)]
    pub age: i32,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "S3cret!pass")]
    pub password: String,
    pub address: Address,
    #[serde(rename = "genero")]
    pub gender: Gender,
    #[serde(rename = "fecha")]
    pub date: DateTime<Utc>,
    #[serde(rename = "estado")]
    pub active: bool,
}

/// Validated update request; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct UserChanges {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<Address>,
    #[serde(rename = "genero")]
    pub gender: Option<Gender>,
    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "estado")]
    pub active: Option<bool>,
}

/// Insert command handed to a repository; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub lastname: String,
    pub age: i32,
    pub email: String,
    pub password_hash: String,
    pub address: Address,
    pub gender: Gender,
    pub date: DateTime<Utc>,
    pub active: bool,
}

/// Partial update handed to a repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub address: Option<Address>,
    pub gender: Option<Gender>,
    pub date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

impl UserPatch {
    /// Apply the patch to an existing record in place.
    pub fn apply_to(self, user: &mut User) {
        let Self {
            name,
            lastname,
            age,
            email,
            password_hash,
            address,
            gender,
            date,
            active,
        } = self;
        if let Some(value) = name {
            user.name = value;
        }
        if let Some(value) = lastname {
            user.lastname = value;
        }
        if let Some(value) = age {
            user.age = value;
        }
        if let Some(value) = email {
            user.email = value;
        }
        if let Some(value) = password_hash {
            user.password_hash = value;
        }
        if let Some(value) = address {
            user.address = value;
        }
        if let Some(value) = gender {
            user.gender = value;
        }
        if let Some(value) = date {
            user.date = value;
        }
        if let Some(value) = active {
            user.active = value;
        }
    }
}

#[cfg(test)]
mod tests;
