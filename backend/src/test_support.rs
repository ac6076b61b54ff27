//! Shared fixtures for unit tests (in `src/`) and integration tests (in
//! `tests/`).

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use crate::domain::{Address, Gender, User, UserId};

/// Clock whose time only moves when a test says so.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used as "now" in tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 29, 17, 22, 27)
        .single()
        .unwrap_or_else(|| panic!("fixed test instant is unambiguous"))
}

pub fn sample_address() -> Address {
    Address {
        street: "Av. Arequipa 123".into(),
        city: "Lima".into(),
        state: "Lima".into(),
        zip: "15001".into(),
    }
}

/// Persisted user with the given id and email.
pub fn sample_user(id: i32, email: &str) -> User {
    User {
        id: UserId::new(id),
        name: "Ada".into(),
        lastname: "Lovelace".into(),
        age: 36,
        email: email.to_owned(),
        password_hash: "$argon2id$v=19$stub".into(),
        address: sample_address(),
        gender: Gender::Femenino,
        date: fixed_now(),
        active: true,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    }
}

/// Create request body that passes the store schema.
pub fn valid_user_body(email: &str) -> Value {
    json!({
        "name": "Ada",
        "lastname": "Lovelace",
        "age": 36,
        "email": email,
        "password": "S3cret!pass",
        "address": {
            "street": "Av. Arequipa 123",
            "city": "Lima",
            "state": "Lima",
            "zip": "15001"
        },
        "genero": "femenino",
        "fecha": "2024-03-01",
        "estado": true
    })
}
