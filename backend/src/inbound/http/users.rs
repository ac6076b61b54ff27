//! Users API handlers.
//!
//! ```text
//! GET    /api/users
//! GET    /api/users/{id}
//! POST   /api/users        (body validated against the store schema)
//! PUT    /api/users/{id}   (body validated against the update schema)
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::domain::user_schema::{user_store_schema, user_update_schema};
use crate::domain::validation::Schema;
use crate::domain::{UserChanges, UserDraft, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{ErrorEnvelope, MessageEnvelope, UserEnvelope, UsersEnvelope};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::Normalized;
use crate::middleware::ValidateBody;

/// Message returned after a successful delete.
pub const USER_DELETED: &str = "Usuario eliminado";

fn update_schema(_request: &HttpRequest) -> Schema {
    user_update_schema()
}

/// List users.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = UsersEnvelope),
        (status = 503, description = "Database unavailable", body = ErrorEnvelope),
        (status = 504, description = "Database timeout", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<UsersEnvelope>> {
    let users = state.users.index().await?;
    Ok(web::Json(UsersEnvelope::new(users)))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserEnvelope),
        (status = 404, description = "Unknown user", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "showUser"
)]
#[get("/users/{id}")]
pub async fn show_user(
    state: web::Data<HttpState>,
    id: web::Path<i32>,
) -> ApiResult<web::Json<UserEnvelope>> {
    let user = state.users.show(UserId::new(id.into_inner())).await?;
    Ok(web::Json(UserEnvelope::new(user)))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserDraft,
    responses(
        (status = 201, description = "Created", body = UserEnvelope),
        (status = 400, description = "Invalid body or duplicate email", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "storeUser"
)]
#[post("/users", wrap = "ValidateBody::new(user_store_schema())")]
pub async fn store_user(
    state: web::Data<HttpState>,
    Normalized(draft): Normalized<UserDraft>,
) -> ApiResult<HttpResponse> {
    let user = state.users.store(draft).await?;
    Ok(HttpResponse::Created().json(UserEnvelope::new(user)))
}

/// Change some fields of a user.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    request_body = UserChanges,
    responses(
        (status = 200, description = "Updated", body = UserEnvelope),
        (status = 400, description = "Invalid body or duplicate email", body = ErrorEnvelope),
        (status = 404, description = "Unknown user", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}", wrap = "ValidateBody::new(update_schema)")]
pub async fn update_user(
    state: web::Data<HttpState>,
    id: web::Path<i32>,
    Normalized(changes): Normalized<UserChanges>,
) -> ApiResult<web::Json<UserEnvelope>> {
    let user = state
        .users
        .update(UserId::new(id.into_inner()), changes)
        .await?;
    Ok(web::Json(UserEnvelope::new(user)))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Deleted", body = MessageEnvelope),
        (status = 404, description = "Unknown user", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "destroyUser"
)]
#[delete("/users/{id}")]
pub async fn destroy_user(
    state: web::Data<HttpState>,
    id: web::Path<i32>,
) -> ApiResult<web::Json<MessageEnvelope>> {
    state.users.destroy(UserId::new(id.into_inner())).await?;
    Ok(web::Json(MessageEnvelope::new(USER_DELETED)))
}
