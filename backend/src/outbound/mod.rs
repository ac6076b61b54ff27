//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL `UserRepository` using Diesel
//! - **memory**: in-process `UserRepository` for database-less runs and tests
//! - **cache**: in-process `Cache` with clock-driven expiry

pub mod cache;
pub mod memory;
pub mod persistence;
