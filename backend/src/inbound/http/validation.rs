//! Request-side validation plumbing for HTTP handlers.
//!
//! [`SchemaProvider`] picks the schema for a request (a fixed [`Schema`] or a
//! function of the request). The
//! [`ValidateBody`](crate::middleware::ValidateBody) middleware runs it and
//! stores the [`NormalizedPayload`] in the request extensions, where the
//! [`Normalized`] extractor picks it up.

use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};
use serde::de::DeserializeOwned;

use crate::domain::Failure;
use crate::domain::validation::{NormalizedPayload, Schema};

/// Chooses the schema used to validate a request body.
pub trait SchemaProvider: Send + Sync + 'static {
    fn resolve(&self, request: &HttpRequest) -> Schema;
}

impl SchemaProvider for Schema {
    fn resolve(&self, _request: &HttpRequest) -> Schema {
        self.clone()
    }
}

impl<F> SchemaProvider for F
where
    F: Fn(&HttpRequest) -> Schema + Send + Sync + 'static,
{
    fn resolve(&self, request: &HttpRequest) -> Schema {
        self(request)
    }
}

/// Validated body decoded into `T`.
///
/// Only usable behind [`ValidateBody`](crate::middleware::ValidateBody);
/// without it extraction fails with an internal error. Values that pass the
/// schema but do not fit `T` (an `age` beyond `i32`, say) fail as a type
/// mismatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T>(pub T);

impl<T> Normalized<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Normalized<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned + 'static> FromRequest for Normalized<T> {
    type Error = Failure;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        let decoded = match extensions.get::<NormalizedPayload>() {
            Some(payload) => payload
                .deserialize::<T>()
                .map(Normalized)
                .map_err(|error| Failure::type_mismatch("TypeError", error.to_string())),
            None => Err(Failure::internal("request body was not validated")),
        };
        ready(decoded)
    }
}
