//! Internal Diesel row structs. Never exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::users;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub name: String,
    pub lastname: String,
    pub age: i32,
    pub email: String,
    pub password: String,
    pub address: Value,
    pub genero: String,
    pub fecha: DateTime<Utc>,
    pub estado: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub lastname: &'a str,
    pub age: i32,
    pub email: &'a str,
    pub password: &'a str,
    pub address: Value,
    pub genero: &'a str,
    pub fecha: DateTime<Utc>,
    pub estado: bool,
}

/// Partial update; `None` columns are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: Option<&'a str>,
    pub lastname: Option<&'a str>,
    pub age: Option<i32>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub address: Option<Value>,
    pub genero: Option<&'a str>,
    pub fecha: Option<DateTime<Utc>>,
    pub estado: Option<bool>,
}

impl UserChangeset<'_> {
    /// Diesel rejects a changeset that sets no column.
    pub fn is_empty(&self) -> bool {
        let Self {
            name,
            lastname,
            age,
            email,
            password,
            address,
            genero,
            fecha,
            estado,
        } = self;
        name.is_none()
            && lastname.is_none()
            && age.is_none()
            && email.is_none()
            && password.is_none()
            && address.is_none()
            && genero.is_none()
            && fecha.is_none()
            && estado.is_none()
    }
}
