//! Classification of Diesel and pool errors into [`Failure`]s.
//!
//! PostgreSQL reports the offending columns and values only in the error
//! detail (`Key (email)=(x@example.com) already exists.`), so constraint
//! failures are rebuilt from that text.

use std::sync::OnceLock;

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::pool::PoolError;
use crate::domain::{ConstraintItem, Failure};

const STATEMENT_TIMEOUT: &str = "canceling statement due to statement timeout";
const EXCLUSION_VIOLATION: &str = "violates exclusion constraint";

fn key_detail() -> &'static Regex {
    static KEY_DETAIL: OnceLock<Regex> = OnceLock::new();
    KEY_DETAIL.get_or_init(|| {
        Regex::new(r"Key \((?P<columns>[^)]*)\)=\((?P<values>.*)\)")
            .unwrap_or_else(|err| panic!("key detail pattern must compile: {err}"))
    })
}

/// Columns and values named in a `Key (..)=(..)` detail.
fn parse_key_detail(detail: &str) -> Vec<(String, String)> {
    let Some(captures) = key_detail().captures(detail) else {
        return Vec::new();
    };
    let columns = captures.name("columns").map_or("", |m| m.as_str());
    let values = captures.name("values").map_or("", |m| m.as_str());
    let columns: Vec<&str> = columns.split(", ").collect();
    // A single column owns the whole value, commas included.
    let values: Vec<&str> = if columns.len() == 1 {
        vec![values]
    } else {
        values.split(", ").collect()
    };
    columns
        .into_iter()
        .enumerate()
        .filter(|(_, column)| !column.is_empty())
        .map(|(index, column)| {
            let value = values.get(index).copied().unwrap_or_default();
            (column.trim_matches('"').to_owned(), value.to_owned())
        })
        .collect()
}

fn unique_violation(info: &dyn DatabaseErrorInformation) -> Failure {
    let keys = parse_key_detail(info.details().unwrap_or_default());
    if keys.is_empty() {
        let column = info.column_name().unwrap_or("unknown");
        let item = ConstraintItem::new(column, format!("{column} must be unique"))
            .with_validator("not_unique");
        return Failure::UniqueConstraint { items: vec![item] };
    }
    let items = keys
        .into_iter()
        .map(|(column, value)| {
            ConstraintItem::new(column.clone(), format!("{column} must be unique"))
                .with_value(Value::String(value))
                .with_validator("not_unique")
        })
        .collect();
    Failure::UniqueConstraint { items }
}

fn foreign_key_violation(info: &dyn DatabaseErrorInformation) -> Failure {
    let fields = parse_key_detail(info.details().unwrap_or_default())
        .into_iter()
        .map(|(column, _)| column)
        .collect();
    Failure::ForeignKeyConstraint {
        table: info.table_name().map(str::to_owned),
        fields,
        constraint: info.constraint_name().map(str::to_owned),
    }
}

fn column_violation(info: &dyn DatabaseErrorInformation, validator: &str) -> Failure {
    let column = info
        .column_name()
        .or_else(|| info.constraint_name())
        .unwrap_or("unknown");
    let item = ConstraintItem::new(column, info.message()).with_validator(validator);
    Failure::Validation { items: vec![item] }
}

/// Classify a database-reported error.
pub(crate) fn map_database_error(
    kind: &DatabaseErrorKind,
    info: &dyn DatabaseErrorInformation,
) -> Failure {
    debug!(
        ?kind,
        message = info.message(),
        constraint = info.constraint_name(),
        "database rejected statement"
    );
    match kind {
        DatabaseErrorKind::UniqueViolation => unique_violation(info),
        DatabaseErrorKind::ForeignKeyViolation => foreign_key_violation(info),
        DatabaseErrorKind::NotNullViolation => column_violation(info, "not_null"),
        DatabaseErrorKind::CheckViolation => column_violation(info, "check"),
        DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand => {
            Failure::connection(info.message())
        }
        _ if info.message().contains(STATEMENT_TIMEOUT) => Failure::timeout(info.message()),
        _ if info.message().contains(EXCLUSION_VIOLATION) => Failure::ExclusionConstraint {
            constraint: info.constraint_name().map(str::to_owned),
            table: info.table_name().map(str::to_owned),
        },
        _ => Failure::database(info.message(), None),
    }
}

/// Classify any Diesel error.
pub(crate) fn map_diesel_error(error: DieselError) -> Failure {
    match error {
        DieselError::DatabaseError(kind, info) => map_database_error(&kind, info.as_ref()),
        DieselError::DeserializationError(err) => {
            Failure::type_mismatch("DeserializationError", err.to_string())
        }
        DieselError::SerializationError(err) => {
            Failure::type_mismatch("SerializationError", err.to_string())
        }
        DieselError::NotFound => Failure::orm("EmptyResultError", "record not found"),
        DieselError::QueryBuilderError(err) => Failure::orm("QueryBuilderError", err.to_string()),
        other => {
            debug!(error = %other, "diesel operation failed");
            Failure::orm("DieselError", other.to_string())
        }
    }
}

/// Classify a pool failure by the text the driver produced.
pub(crate) fn map_pool_error(error: PoolError) -> Failure {
    let message = error.message();
    let lower = message.to_lowercase();
    debug!(%error, "connection checkout failed");
    if lower.contains("refused") {
        Failure::connection_refused(message)
    } else if lower.contains("timed out") {
        Failure::timeout(message)
    } else {
        Failure::connection(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Default)]
    struct Info {
        message: &'static str,
        details: Option<&'static str>,
        table: Option<&'static str>,
        column: Option<&'static str>,
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.message
        }
        fn details(&self) -> Option<&str> {
            self.details
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            self.table
        }
        fn column_name(&self) -> Option<&str> {
            self.column
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[rstest]
    #[case("Key (email)=(x@example.com) already exists.", vec![("email", "x@example.com")])]
    #[case("Key (tenant, email)=(7, a@b.co) already exists.", vec![("tenant", "7"), ("email", "a@b.co")])]
    #[case("Key (\"Email\")=(A@B.CO) already exists.", vec![("Email", "A@B.CO")])]
    #[case("Key (name)=(Smith, John) already exists.", vec![("name", "Smith, John")])]
    #[case("no key here", vec![])]
    fn key_details_are_parsed(#[case] detail: &str, #[case] expected: Vec<(&str, &str)>) {
        let parsed = parse_key_detail(detail);
        let parsed: Vec<(&str, &str)> = parsed
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
            .collect();
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn unique_violation_carries_column_and_value() {
        let info = Info {
            message: "duplicate key value violates unique constraint \"users_email_key\"",
            details: Some("Key (email)=(x@example.com) already exists."),
            constraint: Some("users_email_key"),
            ..Info::default()
        };
        let failure = map_database_error(&DatabaseErrorKind::UniqueViolation, &info);
        assert_eq!(failure, Failure::unique("email", "x@example.com"));
    }

    #[rstest]
    fn unique_violation_without_detail_keeps_the_column() {
        let info = Info {
            message: "duplicate key",
            column: Some("email"),
            ..Info::default()
        };
        let failure = map_database_error(&DatabaseErrorKind::UniqueViolation, &info);
        let item = failure.items().first().cloned();
        assert_eq!(item.as_ref().and_then(|i| i.path.as_deref()), Some("email"));
        assert_eq!(item.and_then(|i| i.value), None);
    }

    #[rstest]
    fn foreign_key_violation_names_table_and_fields() {
        let info = Info {
            message: "insert or update violates foreign key constraint",
            details: Some("Key (team_id)=(9) is not present in table \"teams\"."),
            table: Some("users"),
            constraint: Some("users_team_id_fkey"),
            ..Info::default()
        };
        assert_eq!(
            map_database_error(&DatabaseErrorKind::ForeignKeyViolation, &info),
            Failure::ForeignKeyConstraint {
                table: Some("users".into()),
                fields: vec!["team_id".into()],
                constraint: Some("users_team_id_fkey".into()),
            }
        );
    }

    #[rstest]
    #[case(DatabaseErrorKind::NotNullViolation, "not_null")]
    #[case(DatabaseErrorKind::CheckViolation, "check")]
    fn column_violations_become_validation_failures(
        #[case] kind: DatabaseErrorKind,
        #[case] validator: &str,
    ) {
        let info = Info {
            message: "violates constraint",
            column: Some("age"),
            ..Info::default()
        };
        let failure = map_database_error(&kind, &info);
        assert_eq!(failure.name(), "ValidationError");
        assert_eq!(
            failure.items().first().and_then(|i| i.validator.as_deref()),
            Some(validator)
        );
    }

    #[rstest]
    #[case(STATEMENT_TIMEOUT, "TimeoutError")]
    #[case("conflicting key value violates exclusion constraint \"no_overlap\"", "ExclusionConstraintError")]
    #[case("relation \"users\" does not exist", "DatabaseError")]
    fn unknown_kinds_are_classified_by_message(#[case] message: &'static str, #[case] name: &str) {
        let info = Info {
            message,
            ..Info::default()
        };
        assert_eq!(map_database_error(&DatabaseErrorKind::Unknown, &info).name(), name);
    }

    #[rstest]
    fn closed_connections_are_connection_failures() {
        let info = Info {
            message: "server closed the connection unexpectedly",
            ..Info::default()
        };
        assert_eq!(
            map_database_error(&DatabaseErrorKind::ClosedConnection, &info),
            Failure::connection("server closed the connection unexpectedly")
        );
    }

    #[rstest]
    #[case(PoolError::checkout("Connection refused (os error 111)"), "ConnectionRefusedError")]
    #[case(PoolError::checkout("Timed out in bb8"), "TimeoutError")]
    #[case(PoolError::checkout("password authentication failed"), "ConnectionError")]
    fn pool_errors_are_classified(#[case] error: PoolError, #[case] name: &str) {
        assert_eq!(map_pool_error(error).name(), name);
    }

    #[rstest]
    fn not_found_is_an_orm_failure() {
        assert_eq!(map_diesel_error(DieselError::NotFound).name(), "EmptyResultError");
    }
}
