//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::UserRepository;
use crate::domain::{Address, Failure, Gender, NewUser, User, UserId, UserPatch};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn gender_from_column(value: &str) -> Result<Gender, Failure> {
    match value {
        "masculino" => Ok(Gender::Masculino),
        "femenino" => Ok(Gender::Femenino),
        other => {
            warn!(value = other, "unrecognised genero value in users table");
            Err(Failure::type_mismatch(
                "DeserializationError",
                format!("unknown genero value: {other}"),
            ))
        }
    }
}

fn address_to_column(address: &Address) -> Result<serde_json::Value, Failure> {
    serde_json::to_value(address)
        .map_err(|err| Failure::type_mismatch("SerializationError", err.to_string()))
}

fn row_to_user(row: UserRow) -> Result<User, Failure> {
    let address: Address = serde_json::from_value(row.address)
        .map_err(|err| Failure::type_mismatch("DeserializationError", err.to_string()))?;
    Ok(User {
        id: UserId::new(row.id),
        name: row.name,
        lastname: row.lastname,
        age: row.age,
        email: row.email,
        password_hash: row.password,
        address,
        gender: gender_from_column(&row.genero)?,
        date: row.fecha,
        active: row.estado,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, Failure> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, Failure> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<User, Failure> {
        let row = NewUserRow {
            name: &user.name,
            lastname: &user.lastname,
            age: user.age,
            email: &user.email,
            password: &user.password_hash,
            address: address_to_column(&user.address)?,
            genero: user.gender.as_str(),
            fecha: user.date,
            estado: user.active,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(stored)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>, Failure> {
        let address = patch.address.as_ref().map(address_to_column).transpose()?;
        let changes = UserChangeset {
            name: patch.name.as_deref(),
            lastname: patch.lastname.as_deref(),
            age: patch.age,
            email: patch.email.as_deref(),
            password: patch.password_hash.as_deref(),
            address,
            genero: patch.gender.map(Gender::as_str),
            fecha: patch.date,
            estado: patch.active,
        };
        if changes.is_empty() {
            return self.find(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, Failure> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_now, sample_address};
    use rstest::rstest;
    use serde_json::json;

    fn row(genero: &str, address: serde_json::Value) -> UserRow {
        UserRow {
            id: 3,
            name: "Ada".into(),
            lastname: "Lovelace".into(),
            age: 36,
            email: "ada@example.com".into(),
            password: "$argon2id$v=19$stub".into(),
            address,
            genero: genero.into(),
            fecha: fixed_now(),
            estado: true,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    #[rstest]
    fn rows_map_to_users() {
        let address = address_to_column(&sample_address()).expect("encode");
        let user = row_to_user(row("masculino", address)).expect("decode");
        assert_eq!(user.id, UserId::new(3));
        assert_eq!(user.gender, Gender::Masculino);
        assert_eq!(user.address, sample_address());
        assert_eq!(user.password_hash, "$argon2id$v=19$stub");
    }

    #[rstest]
    #[case("otro", json!({ "street": "Av. Arequipa 123", "city": "Lima", "state": "Lima", "zip": "15001" }))]
    #[case("femenino", json!({ "street": "Av. Arequipa 123" }))]
    fn malformed_rows_are_type_mismatches(#[case] genero: &str, #[case] address: serde_json::Value) {
        let err = row_to_user(row(genero, address)).expect_err("malformed");
        assert_eq!(err.name(), "DeserializationError");
    }

    #[rstest]
    fn empty_changesets_are_detected() {
        assert!(UserChangeset::default().is_empty());
        let changes = UserChangeset {
            estado: Some(false),
            ..UserChangeset::default()
        };
        assert!(!changes.is_empty());
    }
}
