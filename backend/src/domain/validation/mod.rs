//! Schema-driven request body validation.
//!
//! A [`Schema`] describes the expected shape of a JSON body. Running it
//! yields a [`ValidationResult`]: either the coerced [`NormalizedPayload`] or
//! the first issue found, reduced to the field that failed and a message.
//! Messages emitted by built-in checks are structured and resolved through a
//! [`Translator`] (see [`messages`]).

pub mod messages;
mod schema;
mod value;

pub use self::messages::{
    Locale, Localizer, MessageCatalog, Translator, UnsupportedLocale, resolve_message,
    structured_message,
};
pub use self::schema::{
    Field, FieldKind, Issue, NumberCheck, NumberRule, Schema, StringCheck, StringRule, boolean,
    date, number, picklist, string,
};
pub use self::value::{NormalizedPayload, NormalizedValue};

use serde_json::Value;

/// Outcome of validating one request body.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Body satisfied the schema.
    Success { data: NormalizedPayload },
    /// First issue reported by the schema.
    Failure {
        /// Top-level key that failed; `None` for whole-body failures.
        field: Option<String>,
        /// Validation key of the failed rule.
        validation: String,
        /// Raw message, possibly structured.
        message: String,
    },
}

impl ValidationResult {
    /// Run `schema` against an already parsed body.
    ///
    /// Only the first issue survives; later issues are discarded.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use userdesk::domain::validation::{Schema, ValidationResult, string};
    ///
    /// let schema = Schema::new().field("name", string().min_length(3));
    /// let result = ValidationResult::check(&schema, &json!({}));
    /// assert_eq!(result.body_key(), Some("name"));
    /// ```
    pub fn check(schema: &Schema, body: &Value) -> Self {
        match schema.validate(body) {
            Ok(data) => Self::Success { data },
            Err(issues) => issues
                .into_iter()
                .next()
                .map_or_else(Self::unreadable_body, |issue| Self::Failure {
                    field: issue.path.into_iter().next(),
                    validation: issue.validation,
                    message: issue.message,
                }),
        }
    }

    /// Parse raw body bytes and run `schema` against them.
    ///
    /// Empty bodies are treated as `{}`; bytes that are not JSON fail as a
    /// whole-body issue.
    pub fn check_bytes(schema: &Schema, bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::check(schema, &Value::Object(serde_json::Map::new()));
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(body) => Self::check(schema, &body),
            Err(_) => Self::unreadable_body(),
        }
    }

    fn unreadable_body() -> Self {
        Self::Failure {
            field: None,
            validation: "object".to_owned(),
            message: structured_message("validation.object", &[]),
        }
    }

    /// Key reported as the failure body: the field name, or the validation
    /// key when the whole body failed. `None` on success.
    pub fn body_key(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure {
                field, validation, ..
            } => Some(field.as_deref().unwrap_or(validation)),
        }
    }

    /// Failure message resolved through `translator`. `None` on success.
    pub fn message(&self, translator: &dyn Translator) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(resolve_message(message, translator)),
        }
    }
}
