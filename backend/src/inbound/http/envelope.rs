//! JSON envelopes wrapping every API response.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::User;

/// Failure envelope.
///
/// `stack` and `details` are only present in development mode.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always `false`.
    #[schema(example = false)]
    pub success: bool,
    /// Human-readable summary.
    #[schema(example = "Error de validación en los datos")]
    pub message: String,
    /// Machine-readable detail: an offending field name, or an object with
    /// constraint and table information.
    #[schema(value_type = Object)]
    pub body: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    /// Production envelope with no diagnostics.
    pub fn new(message: impl Into<String>, body: Value) -> Self {
        Self {
            success: false,
            message: message.into(),
            body,
            stack: None,
            details: None,
        }
    }
}

/// Single-user response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserEnvelope {
    #[schema(example = true)]
    pub success: bool,
    pub user: User,
}

impl UserEnvelope {
    pub fn new(user: User) -> Self {
        Self {
            success: true,
            user,
        }
    }
}

/// User list response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsersEnvelope {
    #[schema(example = true)]
    pub success: bool,
    pub data: Vec<User>,
}

impl UsersEnvelope {
    pub fn new(data: Vec<User>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Acknowledgement without a payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageEnvelope {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Usuario eliminado")]
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Body returned for unmatched `/api` paths.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RouteNotFoundEnvelope {
    #[schema(example = 404)]
    pub error: u16,
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "This endpoint is not correct")]
    pub message: String,
}
