//! OpenAPI documentation.
//!
//! [`ApiDoc`] collects the user CRUD endpoints, the health probes and the
//! response envelopes. Swagger UI serves it at `/docs` in debug builds.

use utoipa::OpenApi;

use crate::domain::{Address, Gender, User, UserChanges, UserDraft, UserId};
use crate::inbound::http::envelope::{
    ErrorEnvelope, MessageEnvelope, RouteNotFoundEnvelope, UserEnvelope, UsersEnvelope,
};
use crate::inbound::http::health::ProbeEnvelope;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Userdesk API",
        description = "User management with schema-validated bodies and uniform error envelopes.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::show_user,
        crate::inbound::http::users::store_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::destroy_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        UserId,
        Address,
        Gender,
        UserDraft,
        UserChanges,
        UserEnvelope,
        UsersEnvelope,
        MessageEnvelope,
        ErrorEnvelope,
        RouteNotFoundEnvelope,
        ProbeEnvelope,
    )),
    tags(
        (name = "users", description = "User CRUD"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
