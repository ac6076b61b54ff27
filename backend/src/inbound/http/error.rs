//! Failure classification for HTTP responses.
//!
//! Purpose: turn any [`Failure`] raised below the HTTP layer into an
//! [`ErrorEnvelope`] and status code. Classification is an exhaustive match
//! over the failure variants; the only input besides the failure is the
//! [`RunMode`], which decides whether diagnostics (`stack`, `details`) are
//! exposed.
//!
//! Handlers return `Result<_, Failure>`. `Failure` implements
//! [`ResponseError`] with production rendering; the
//! [`NormalizeErrors`](crate::middleware::NormalizeErrors) middleware then
//! re-renders it for the configured mode and logs it with request context.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::{Value, json};
use tracing::{error, warn};

use super::envelope::ErrorEnvelope;
use crate::domain::{ConstraintItem, Failure, TraceId};
use crate::settings::RunMode;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Failure>;

/// Message used when nothing better is available.
pub const INTERNAL_MESSAGE: &str = "Error interno del servidor";

/// Request attributes attached to failure logs.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub method: &'a str,
}

/// Classified failure ready to be written as a response.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedError {
    pub status: StatusCode,
    pub envelope: ErrorEnvelope,
}

impl NormalizedError {
    /// Render as a JSON response.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status).json(self.envelope)
    }
}

/// Maps failures to envelopes for a fixed run mode.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use userdesk::domain::Failure;
/// use userdesk::inbound::http::error::ErrorNormalizer;
/// use userdesk::settings::RunMode;
///
/// let normalizer = ErrorNormalizer::new(RunMode::Production);
/// let normalized = normalizer.classify(&Failure::timeout("statement timeout"));
/// assert_eq!(normalized.status, StatusCode::GATEWAY_TIMEOUT);
/// assert!(normalized.envelope.stack.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorNormalizer {
    mode: RunMode,
}

impl ErrorNormalizer {
    pub fn new(mode: RunMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Log `failure` with request context, then classify it.
    pub fn normalize(&self, failure: &Failure, context: RequestContext<'_>) -> NormalizedError {
        let normalized = self.classify(failure);
        log_failure(
            normalized.status,
            failure.name(),
            &failure.to_string(),
            context,
        );
        normalized
    }

    /// Classify an error that is not a [`Failure`] (framework errors such as
    /// unparsable path segments) through the fallback branch.
    pub fn normalize_foreign(
        &self,
        status: StatusCode,
        message: &str,
        context: RequestContext<'_>,
    ) -> NormalizedError {
        log_failure(status, "Error", message, context);
        let text = non_empty(message).unwrap_or(INTERNAL_MESSAGE);
        let mut envelope = ErrorEnvelope::new(text, json!({}));
        if self.mode.is_development() {
            envelope.stack = Some(format!("Error: {message}"));
        }
        NormalizedError { status, envelope }
    }

    /// Map `failure` to its status and envelope without side effects.
    pub fn classify(&self, failure: &Failure) -> NormalizedError {
        let (status, message, body) = match failure {
            Failure::UniqueConstraint { items } => unique_violation(items.first()),
            Failure::Validation { items } => (
                StatusCode::BAD_REQUEST,
                "Error de validación en los datos".to_owned(),
                json!({ "errors": items.iter().map(validation_detail).collect::<Vec<_>>() }),
            ),
            Failure::ForeignKeyConstraint { table, fields, .. } => (
                StatusCode::BAD_REQUEST,
                "Esto ya tiene elementos relacionados, eliminalos primero.".to_owned(),
                json!({
                    "table": table,
                    "fields": fields,
                    "errorType": "FOREIGN_KEY_CONSTRAINT",
                }),
            ),
            Failure::Connection { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Error de conexión con la base de datos".to_owned(),
                json!({ "errorType": "DATABASE_CONNECTION_ERROR" }),
            ),
            Failure::Timeout { .. } => (
                StatusCode::GATEWAY_TIMEOUT,
                "Timeout en la operación de base de datos".to_owned(),
                json!({ "errorType": "DATABASE_TIMEOUT" }),
            ),
            Failure::Database { message, sql } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error interno de base de datos".to_owned(),
                json!({
                    "originalError": message,
                    "sql": sql,
                    "errorType": "DATABASE_ERROR",
                }),
            ),
            Failure::ExclusionConstraint { constraint, table } => (
                StatusCode::BAD_REQUEST,
                "Violación de constraint de exclusión".to_owned(),
                json!({
                    "constraint": constraint,
                    "table": table,
                    "errorType": "EXCLUSION_CONSTRAINT",
                }),
            ),
            Failure::TypeMismatch { name, .. } => (
                StatusCode::BAD_REQUEST,
                "Tipo de dato incorrecto".to_owned(),
                json!({ "body": name }),
            ),
            Failure::Orm { name, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error inesperado de base de datos".to_owned(),
                json!({ "name": name, "message": message, "errorType": "ORM_ERROR" }),
            ),
            Failure::Unclassified {
                status,
                message,
                items,
            } => (
                status
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .filter(|code| code.is_client_error() || code.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                items
                    .first()
                    .and_then(|item| non_empty(&item.message))
                    .or_else(|| non_empty(message))
                    .unwrap_or(INTERNAL_MESSAGE)
                    .to_owned(),
                json!({}),
            ),
        };

        let mut envelope = ErrorEnvelope::new(message, body);
        if self.mode.is_development() {
            envelope.stack = Some(format!("{}: {failure}", failure.name()));
            let items = failure.items();
            if !items.is_empty() {
                envelope.details = serde_json::to_value(items).ok();
            }
        }
        NormalizedError { status, envelope }
    }
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.trim().is_empty()).then_some(text)
}

fn unique_violation(item: Option<&ConstraintItem>) -> (StatusCode, String, Value) {
    let value = item
        .and_then(|item| item.value.as_ref())
        .and_then(|value| match value {
            Value::String(text) => non_empty(text).map(str::to_owned),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| "unknown".to_owned());
    let body = item
        .and_then(|item| item.path.clone())
        .map_or_else(|| json!({}), Value::String);
    (StatusCode::BAD_REQUEST, format!("{value} ya existe."), body)
}

fn validation_detail(item: &ConstraintItem) -> Value {
    json!({
        "field": item.path,
        "message": item.message,
        "value": item.value,
        "validator": item.validator,
    })
}

fn log_failure(status: StatusCode, name: &str, detail: &str, context: RequestContext<'_>) {
    let trace_id = TraceId::current().map(|id| id.to_string());
    if status.is_server_error() {
        error!(
            status = status.as_u16(),
            error = name,
            detail,
            path = context.path,
            method = context.method,
            trace_id = trace_id.as_deref(),
            "request failed"
        );
    } else {
        warn!(
            status = status.as_u16(),
            error = name,
            detail,
            path = context.path,
            method = context.method,
            trace_id = trace_id.as_deref(),
            "request rejected"
        );
    }
}

impl ResponseError for Failure {
    fn status_code(&self) -> StatusCode {
        ErrorNormalizer::default().classify(self).status
    }

    fn error_response(&self) -> HttpResponse {
        ErrorNormalizer::default().classify(self).into_response()
    }
}

#[cfg(test)]
mod tests;
