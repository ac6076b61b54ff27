//! Domain primitives, services and ports.
//!
//! Purpose: define the user model, the request validation engine and the
//! failure taxonomy shared by every layer. Nothing in here knows about HTTP
//! or a particular database.
//!
//! Public surface:
//! - `Failure` — tagged storage/service failure classified by the HTTP layer.
//! - `validation` — schemas, normalized payloads and message catalogs.
//! - `User` and its commands (`UserDraft`, `UserChanges`, `NewUser`, `UserPatch`).
//! - `UserService` — CRUD orchestration over the `UserRepository` and `Cache` ports.
//! - `TraceId` — request correlation identifier.

pub mod failure;
pub mod password;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_schema;
pub mod users_service;
pub mod validation;

pub use self::failure::{ConstraintItem, Failure};
pub use self::trace_id::TraceId;
pub use self::user::{
    Address, Gender, NewUser, User, UserChanges, UserDraft, UserId, UserPatch,
};
pub use self::users_service::UserService;
