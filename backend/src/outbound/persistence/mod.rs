//! PostgreSQL persistence through Diesel.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! internal; repositories translate them to domain types and translate every
//! Diesel or pool error into a [`Failure`](crate::domain::Failure).
//!
//! ```no_run
//! use userdesk::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users"));
//! let _users = DieselUserRepository::new(pool);
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
