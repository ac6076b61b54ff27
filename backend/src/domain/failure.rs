//! Failures raised by persistence adapters and domain services.
//!
//! Adapters translate driver- and ORM-specific errors into [`Failure`] so the
//! inbound layer can classify them without knowing which storage backend
//! produced them. Each variant corresponds to one row of the error
//! normalization table in `inbound::http::error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Detail for a single offending field inside a constraint or validation
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintItem {
    /// Column or attribute path that triggered the failure.
    pub path: Option<String>,
    /// Human-readable description of the violation.
    pub message: String,
    /// Offending value, when the adapter could recover it.
    pub value: Option<Value>,
    /// Name of the rule that rejected the value (for example `not_unique`).
    pub validator: Option<String>,
}

impl ConstraintItem {
    /// Build an item for `path` with the given message.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
            value: None,
            validator: None,
        }
    }

    /// Attach the offending value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach the rule name that rejected the value.
    pub fn with_validator(mut self, validator: impl Into<String>) -> Self {
        self.validator = Some(validator.into());
        self
    }
}

/// Tagged failure returned by persistence ports and services.
///
/// Variants are disjoint, so classification is a plain exhaustive match.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated")]
    UniqueConstraint { items: Vec<ConstraintItem> },
    /// One or more attribute-level validations failed in the storage layer.
    #[error("validation failed")]
    Validation { items: Vec<ConstraintItem> },
    /// The row is still referenced by, or references, another table.
    #[error("foreign key constraint violated")]
    ForeignKeyConstraint {
        table: Option<String>,
        fields: Vec<String>,
        constraint: Option<String>,
    },
    /// The storage backend could not be reached.
    #[error("database connection failed: {message}")]
    Connection { message: String, refused: bool },
    /// The storage backend did not answer in time.
    #[error("database operation timed out: {message}")]
    Timeout { message: String },
    /// The database rejected the statement for another reason.
    #[error("database error: {message}")]
    Database { message: String, sql: Option<String> },
    /// An exclusion constraint rejected the write.
    #[error("exclusion constraint violated")]
    ExclusionConstraint {
        constraint: Option<String>,
        table: Option<String>,
    },
    /// A value could not be converted to or from its expected type.
    #[error("{name}: {message}")]
    TypeMismatch { name: String, message: String },
    /// ORM-level failure that is neither a constraint nor a driver error.
    #[error("{name}: {message}")]
    Orm { name: String, message: String },
    /// Anything else; carries its own status when it has one.
    #[error("{message}")]
    Unclassified {
        status: Option<u16>,
        message: String,
        items: Vec<ConstraintItem>,
    },
}

impl Failure {
    /// Unique violation on a single column.
    ///
    /// # Examples
    /// ```
    /// use userdesk::domain::Failure;
    ///
    /// let failure = Failure::unique("email", "x@example.com");
    /// assert_eq!(failure.name(), "UniqueConstraintError");
    /// ```
    pub fn unique(path: impl Into<String>, value: impl Into<String>) -> Self {
        let path = path.into();
        let item = ConstraintItem::new(path.clone(), format!("{path} must be unique"))
            .with_value(Value::String(value.into()))
            .with_validator("not_unique");
        Self::UniqueConstraint { items: vec![item] }
    }

    /// Connection refused by the storage backend.
    pub fn connection_refused(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            refused: true,
        }
    }

    /// Connection dropped or otherwise unusable.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            refused: false,
        }
    }

    /// Operation exceeded its deadline.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Generic database failure.
    pub fn database(message: impl Into<String>, sql: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql,
        }
    }

    /// Type conversion failure named after the error that produced it.
    pub fn type_mismatch(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            message: message.into(),
        }
    }

    /// ORM-level failure.
    pub fn orm(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Orm {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Unclassified failure with an explicit HTTP status.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self::Unclassified {
            status: Some(status),
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// Missing resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(404, message)
    }

    /// Unexpected internal failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Unclassified {
            status: None,
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// Stable error name, used in diagnostics and type-mismatch bodies.
    pub fn name(&self) -> &str {
        match self {
            Self::UniqueConstraint { .. } => "UniqueConstraintError",
            Self::Validation { .. } => "ValidationError",
            Self::ForeignKeyConstraint { .. } => "ForeignKeyConstraintError",
            Self::Connection { refused: true, .. } => "ConnectionRefusedError",
            Self::Connection { refused: false, .. } => "ConnectionError",
            Self::Timeout { .. } => "TimeoutError",
            Self::Database { .. } => "DatabaseError",
            Self::ExclusionConstraint { .. } => "ExclusionConstraintError",
            Self::TypeMismatch { name, .. } | Self::Orm { name, .. } => name.as_str(),
            Self::Unclassified { .. } => "Error",
        }
    }

    /// Nested detail items carried by the failure, if any.
    pub fn items(&self) -> &[ConstraintItem] {
        match self {
            Self::UniqueConstraint { items }
            | Self::Validation { items }
            | Self::Unclassified { items, .. } => items,
            _ => &[],
        }
    }
}
