//! HTTP inbound adapter exposing REST endpoints.

pub mod envelope;
pub mod error;
pub mod fallback;
pub mod health;
pub mod state;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api` scope and the health probes.
///
/// The caller owns app data, middleware and the default service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(users::list_users)
            .service(users::show_user)
            .service(users::store_user)
            .service(users::update_user)
            .service(users::destroy_user),
    )
    .service(health::ready)
    .service(health::live);
}
