//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain talks to driven adapters (the user store
//! and the cache). Adapters live in `crate::outbound`.

mod macros;
pub(crate) use macros::define_port_error;

mod cache;
mod user_repository;

#[cfg(test)]
pub use cache::MockCache;
pub use cache::{Cache, CacheError, CacheTtl, get_json, set_json};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
