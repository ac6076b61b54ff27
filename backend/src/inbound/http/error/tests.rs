//! Tests for failure classification.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn production() -> ErrorNormalizer {
    ErrorNormalizer::new(RunMode::Production)
}

#[fixture]
fn development() -> ErrorNormalizer {
    ErrorNormalizer::new(RunMode::Development)
}

fn context() -> RequestContext<'static> {
    RequestContext {
        path: "/api/users",
        method: "POST",
    }
}

fn validation_failure() -> Failure {
    Failure::Validation {
        items: vec![
            ConstraintItem::new("email", "email cannot be null").with_validator("is_null"),
            ConstraintItem::new("age", "age must be positive")
                .with_value(-3)
                .with_validator("min"),
        ],
    }
}

#[rstest]
fn unique_violation_names_the_duplicate_value(production: ErrorNormalizer) {
    let normalized = production.classify(&Failure::unique("email", "x@example.com"));
    assert_eq!(normalized.status, StatusCode::BAD_REQUEST);
    assert!(normalized.envelope.message.contains("x@example.com ya existe."));
    assert_eq!(normalized.envelope.body, json!("email"));
    assert!(!normalized.envelope.success);
}

#[rstest]
fn unique_violation_without_items_uses_placeholders(production: ErrorNormalizer) {
    let normalized = production.classify(&Failure::UniqueConstraint { items: Vec::new() });
    assert_eq!(normalized.envelope.message, "unknown ya existe.");
    assert_eq!(normalized.envelope.body, json!({}));
}

#[rstest]
fn validation_lists_every_item(production: ErrorNormalizer) {
    let normalized = production.classify(&validation_failure());
    assert_eq!(normalized.status, StatusCode::BAD_REQUEST);
    assert_eq!(normalized.envelope.message, "Error de validación en los datos");
    assert_eq!(
        normalized.envelope.body,
        json!({ "errors": [
            { "field": "email", "message": "email cannot be null", "value": null, "validator": "is_null" },
            { "field": "age", "message": "age must be positive", "value": -3, "validator": "min" },
        ]})
    );
}

#[rstest]
#[case(
    Failure::ForeignKeyConstraint {
        table: Some("orders".into()),
        fields: vec!["user_id".into()],
        constraint: Some("orders_user_id_fkey".into()),
    },
    StatusCode::BAD_REQUEST,
    "Esto ya tiene elementos relacionados, eliminalos primero.",
    json!({ "table": "orders", "fields": ["user_id"], "errorType": "FOREIGN_KEY_CONSTRAINT" })
)]
#[case(
    Failure::connection_refused("connect ECONNREFUSED 127.0.0.1:5432"),
    StatusCode::SERVICE_UNAVAILABLE,
    "Error de conexión con la base de datos",
    json!({ "errorType": "DATABASE_CONNECTION_ERROR" })
)]
#[case(
    Failure::connection("server closed the connection unexpectedly"),
    StatusCode::SERVICE_UNAVAILABLE,
    "Error de conexión con la base de datos",
    json!({ "errorType": "DATABASE_CONNECTION_ERROR" })
)]
#[case(
    Failure::timeout("canceling statement due to statement timeout"),
    StatusCode::GATEWAY_TIMEOUT,
    "Timeout en la operación de base de datos",
    json!({ "errorType": "DATABASE_TIMEOUT" })
)]
#[case(
    Failure::database("relation \"users\" does not exist", Some("SELECT 1".into())),
    StatusCode::INTERNAL_SERVER_ERROR,
    "Error interno de base de datos",
    json!({
        "originalError": "relation \"users\" does not exist",
        "sql": "SELECT 1",
        "errorType": "DATABASE_ERROR"
    })
)]
#[case(
    Failure::ExclusionConstraint {
        constraint: Some("no_overlap".into()),
        table: Some("bookings".into()),
    },
    StatusCode::BAD_REQUEST,
    "Violación de constraint de exclusión",
    json!({ "constraint": "no_overlap", "table": "bookings", "errorType": "EXCLUSION_CONSTRAINT" })
)]
#[case(
    Failure::type_mismatch("TypeError", "invalid type: string, expected i32"),
    StatusCode::BAD_REQUEST,
    "Tipo de dato incorrecto",
    json!({ "body": "TypeError" })
)]
#[case(
    Failure::orm("QueryBuilderError", "empty changeset"),
    StatusCode::INTERNAL_SERVER_ERROR,
    "Error inesperado de base de datos",
    json!({ "name": "QueryBuilderError", "message": "empty changeset", "errorType": "ORM_ERROR" })
)]
fn classification_table(
    production: ErrorNormalizer,
    #[case] failure: Failure,
    #[case] status: StatusCode,
    #[case] message: &str,
    #[case] body: serde_json::Value,
) {
    let normalized = production.classify(&failure);
    assert_eq!(normalized.status, status);
    assert_eq!(normalized.envelope.message, message);
    assert_eq!(normalized.envelope.body, body);
}

#[rstest]
#[case(Failure::not_found("Usuario no encontrado"), StatusCode::NOT_FOUND, "Usuario no encontrado")]
#[case(Failure::internal(""), StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)]
#[case(Failure::with_status(999, "odd"), StatusCode::INTERNAL_SERVER_ERROR, "odd")]
#[case(
    Failure::Unclassified {
        status: Some(409),
        message: "outer".into(),
        items: vec![ConstraintItem::new("email", "inner wins")],
    },
    StatusCode::CONFLICT,
    "inner wins"
)]
fn fallback_branch(
    production: ErrorNormalizer,
    #[case] failure: Failure,
    #[case] status: StatusCode,
    #[case] message: &str,
) {
    let normalized = production.classify(&failure);
    assert_eq!(normalized.status, status);
    assert_eq!(normalized.envelope.message, message);
    assert_eq!(normalized.envelope.body, json!({}));
}

#[rstest]
fn development_adds_stack_and_details(development: ErrorNormalizer) {
    let normalized = development.classify(&validation_failure());
    assert_eq!(
        normalized.envelope.stack.as_deref(),
        Some("ValidationError: validation failed")
    );
    let details = normalized.envelope.details.expect("details");
    assert_eq!(details.as_array().map(Vec::len), Some(2));
}

#[rstest]
fn development_omits_details_when_there_are_no_items(development: ErrorNormalizer) {
    let normalized = development.classify(&Failure::timeout("slow"));
    assert!(normalized.envelope.stack.is_some());
    assert!(normalized.envelope.details.is_none());
}

#[rstest]
fn production_hides_diagnostics(production: ErrorNormalizer) {
    let normalized = production.classify(&validation_failure());
    assert!(normalized.envelope.stack.is_none());
    assert!(normalized.envelope.details.is_none());
}

#[rstest]
#[case(RunMode::Production)]
#[case(RunMode::Development)]
fn normalizing_twice_is_identical(#[case] mode: RunMode) {
    let normalizer = ErrorNormalizer::new(mode);
    let failure = Failure::unique("email", "x@example.com");
    assert_eq!(
        normalizer.normalize(&failure, context()),
        normalizer.normalize(&failure, context())
    );
}

#[rstest]
fn foreign_errors_use_their_own_status(production: ErrorNormalizer) {
    let normalized = production.normalize_foreign(
        StatusCode::PAYLOAD_TOO_LARGE,
        "payload reached size limit",
        context(),
    );
    assert_eq!(normalized.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(normalized.envelope.message, "payload reached size limit");
}

#[rstest]
#[actix_web::test]
async fn response_error_renders_production_envelope() {
    let failure = Failure::connection_refused("refused");
    assert_eq!(
        ResponseError::status_code(&failure),
        StatusCode::SERVICE_UNAVAILABLE
    );
    let response = ResponseError::error_response(&failure);
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(
        value,
        json!({
            "success": false,
            "message": "Error de conexión con la base de datos",
            "body": { "errorType": "DATABASE_CONNECTION_ERROR" }
        })
    );
}
