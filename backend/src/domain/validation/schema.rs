//! Declarative request schemas and the validation walk.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::{Map, Value, json};

use super::messages::structured_message;
use super::value::{NormalizedPayload, NormalizedValue};

/// One problem found while validating a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Keys leading to the offending value; empty for whole-body issues.
    pub path: Vec<String>,
    /// Validation key naming the rule that failed (`min_length`, `email`, ...).
    pub validation: String,
    /// Raw message: structured (translatable) or verbatim text.
    pub message: String,
}

impl Issue {
    fn at(path: &[String], validation: &str, message: String) -> Self {
        Self {
            path: path.to_vec(),
            validation: validation.to_owned(),
            message,
        }
    }
}

/// Check applied to a string field, in declaration order.
#[derive(Debug, Clone)]
pub enum StringCheck {
    /// Minimum length in characters.
    MinLength(usize),
    /// Maximum length in characters.
    MaxLength(usize),
    /// Email address format.
    Email,
    /// Regular expression with an optional verbatim message.
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
    /// Named predicate with a verbatim message.
    Predicate {
        validation: &'static str,
        message: String,
        test: fn(&str) -> bool,
    },
}

/// String field rule.
#[derive(Debug, Clone)]
pub struct StringRule {
    checks: Vec<StringCheck>,
    trim: bool,
}

impl StringRule {
    /// Require at least `min` characters.
    pub fn min_length(mut self, min: usize) -> Self {
        self.checks.push(StringCheck::MinLength(min));
        self
    }

    /// Allow at most `max` characters.
    pub fn max_length(mut self, max: usize) -> Self {
        self.checks.push(StringCheck::MaxLength(max));
        self
    }

    /// Require an email address.
    pub fn email(mut self) -> Self {
        self.checks.push(StringCheck::Email);
        self
    }

    /// Require a regex match; `message` replaces the catalog text.
    pub fn pattern(mut self, regex: Regex, message: Option<String>) -> Self {
        self.checks.push(StringCheck::Pattern { regex, message });
        self
    }

    /// Require `test` to accept the value.
    pub fn predicate(
        mut self,
        validation: &'static str,
        message: impl Into<String>,
        test: fn(&str) -> bool,
    ) -> Self {
        self.checks.push(StringCheck::Predicate {
            validation,
            message: message.into(),
            test,
        });
        self
    }

    /// Keep surrounding whitespace (for secrets such as passwords).
    pub fn raw(mut self) -> Self {
        self.trim = false;
        self
    }
}

/// Check applied to a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberCheck {
    /// Value must have no fractional part.
    Integer,
    /// Inclusive lower bound.
    Min(f64),
    /// Inclusive upper bound.
    Max(f64),
}

/// Numeric field rule.
#[derive(Debug, Clone, Default)]
pub struct NumberRule {
    checks: Vec<NumberCheck>,
}

impl NumberRule {
    /// Require an integer.
    pub fn integer(mut self) -> Self {
        self.checks.push(NumberCheck::Integer);
        self
    }

    /// Inclusive lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.checks.push(NumberCheck::Min(min));
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.checks.push(NumberCheck::Max(max));
        self
    }
}

/// Type and constraints of a schema field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// String with checks.
    String(StringRule),
    /// JSON number with checks.
    Number(NumberRule),
    /// Boolean.
    Boolean,
    /// One of the listed string literals.
    Picklist(Vec<String>),
    /// Date coerced from RFC 3339, `YYYY-MM-DD`, or epoch milliseconds.
    Date,
    /// Nested object.
    Object(Schema),
}

impl FieldKind {
    fn type_key(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Picklist(_) => "picklist",
            Self::Date => "date",
            Self::Object(_) => "object",
        }
    }
}

impl From<StringRule> for FieldKind {
    fn from(rule: StringRule) -> Self {
        Self::String(rule)
    }
}

impl From<NumberRule> for FieldKind {
    fn from(rule: NumberRule) -> Self {
        Self::Number(rule)
    }
}

impl From<Schema> for FieldKind {
    fn from(schema: Schema) -> Self {
        Self::Object(schema)
    }
}

/// Start a string rule. Values are trimmed unless [`StringRule::raw`] is set.
pub fn string() -> StringRule {
    StringRule {
        checks: Vec::new(),
        trim: true,
    }
}

/// Start a number rule.
pub fn number() -> NumberRule {
    NumberRule::default()
}

/// Boolean field.
pub fn boolean() -> FieldKind {
    FieldKind::Boolean
}

/// Field restricted to `allowed` literals.
pub fn picklist<I, S>(allowed: I) -> FieldKind
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FieldKind::Picklist(allowed.into_iter().map(Into::into).collect())
}

/// Date field with coercion.
pub fn date() -> FieldKind {
    FieldKind::Date
}

/// A declared field.
#[derive(Debug, Clone)]
pub struct Field {
    key: String,
    kind: FieldKind,
    optional: bool,
}

impl Field {
    /// Field key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the field may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Ordered set of fields describing an object body.
///
/// Issues are reported in declaration order, so the first declared field
/// that fails is the first issue.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use userdesk::domain::validation::{Schema, string};
///
/// let schema = Schema::new().field("name", string().min_length(3));
/// let issues = schema.validate(&json!({ "name": "Jo" })).unwrap_err();
/// assert_eq!(issues[0].path, vec!["name".to_owned()]);
/// assert_eq!(issues[0].validation, "min_length");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Empty schema accepting `{}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required field.
    pub fn field(mut self, key: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        self.fields.push(Field {
            key: key.into(),
            kind: kind.into(),
            optional: false,
        });
        self
    }

    /// Declare an optional field.
    pub fn optional_field(mut self, key: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        self.fields.push(Field {
            key: key.into(),
            kind: kind.into(),
            optional: true,
        });
        self
    }

    /// Copy of the schema without `keys`.
    pub fn omit(mut self, keys: &[&str]) -> Self {
        self.fields.retain(|field| !keys.contains(&field.key.as_str()));
        self
    }

    /// Copy of the schema with every top-level field optional.
    pub fn partial(mut self) -> Self {
        for field in &mut self.fields {
            field.optional = true;
        }
        self
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validate `body` and coerce it into a [`NormalizedPayload`].
    ///
    /// # Errors
    /// Returns every issue found, in declaration order, when the body does
    /// not satisfy the schema.
    pub fn validate(&self, body: &Value) -> Result<NormalizedPayload, Vec<Issue>> {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        let payload = match body.as_object() {
            Some(object) => self.walk(object, &mut path, &mut issues),
            None => {
                issues.push(Issue::at(
                    &path,
                    "object",
                    structured_message("validation.object", &[]),
                ));
                NormalizedPayload::default()
            }
        };
        if issues.is_empty() {
            Ok(payload)
        } else {
            Err(issues)
        }
    }

    fn walk(
        &self,
        object: &Map<String, Value>,
        path: &mut Vec<String>,
        issues: &mut Vec<Issue>,
    ) -> NormalizedPayload {
        let mut payload = NormalizedPayload::default();
        for field in &self.fields {
            path.push(field.key.clone());
            match object.get(&field.key) {
                None | Some(Value::Null) if field.optional => {}
                None | Some(Value::Null) => issues.push(Issue::at(
                    path,
                    field.kind.type_key(),
                    structured_message("validation.required", &[]),
                )),
                Some(value) => {
                    if let Some(normalized) = check_value(&field.kind, value, path, issues) {
                        payload.insert(field.key.clone(), normalized);
                    }
                }
            }
            path.pop();
        }
        payload
    }
}

fn type_issue(path: &[String], kind: &FieldKind) -> Issue {
    let expected = kind.type_key();
    Issue::at(
        path,
        expected,
        structured_message("validation.type", &[json!(expected)]),
    )
}

fn check_value(
    kind: &FieldKind,
    value: &Value,
    path: &mut Vec<String>,
    issues: &mut Vec<Issue>,
) -> Option<NormalizedValue> {
    let outcome = match kind {
        FieldKind::String(rule) => match value.as_str() {
            Some(text) => check_string(rule, text, path),
            None => Err(type_issue(path, kind)),
        },
        FieldKind::Number(rule) => match value {
            Value::Number(number) => check_number(rule, number, path),
            _ => Err(type_issue(path, kind)),
        },
        FieldKind::Boolean => value
            .as_bool()
            .map(NormalizedValue::Bool)
            .ok_or_else(|| type_issue(path, kind)),
        FieldKind::Picklist(allowed) => check_picklist(allowed, value, path),
        FieldKind::Date => coerce_date(value)
            .map(NormalizedValue::Date)
            .ok_or_else(|| Issue::at(path, "date", structured_message("validation.date", &[]))),
        FieldKind::Object(schema) => match value.as_object() {
            Some(object) => {
                let before = issues.len();
                let nested = schema.walk(object, path, issues);
                if issues.len() > before {
                    return None;
                }
                Ok(NormalizedValue::Object(nested))
            }
            None => Err(type_issue(path, kind)),
        },
    };
    match outcome {
        Ok(normalized) => Some(normalized),
        Err(issue) => {
            issues.push(issue);
            None
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        let pattern = r"(?i)^[\w+-]+(?:\.[\w+-]+)*@[\da-z]+(?:[.-][\da-z]+)*\.[a-z]{2,}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn check_string(rule: &StringRule, text: &str, path: &[String]) -> Result<NormalizedValue, Issue> {
    let text = if rule.trim { text.trim() } else { text };
    let length = text.chars().count();
    for check in &rule.checks {
        let failure = match check {
            StringCheck::MinLength(min) if length < *min => Some((
                "min_length",
                structured_message("validation.min_length", &[json!(min)]),
            )),
            StringCheck::MaxLength(max) if length > *max => Some((
                "max_length",
                structured_message("validation.max_length", &[json!(max)]),
            )),
            StringCheck::Email if !email_regex().is_match(text) => {
                Some(("email", structured_message("validation.email", &[])))
            }
            StringCheck::Pattern { regex, message } if !regex.is_match(text) => Some((
                "regex",
                message
                    .clone()
                    .unwrap_or_else(|| structured_message("validation.pattern", &[])),
            )),
            StringCheck::Predicate {
                validation,
                message,
                test,
            } if !test(text) => Some((*validation, message.clone())),
            _ => None,
        };
        if let Some((validation, message)) = failure {
            return Err(Issue::at(path, validation, message));
        }
    }
    Ok(NormalizedValue::String(text.to_owned()))
}

fn check_number(
    rule: &NumberRule,
    number: &serde_json::Number,
    path: &[String],
) -> Result<NormalizedValue, Issue> {
    let value = number.as_f64().unwrap_or(f64::NAN);
    for check in &rule.checks {
        let failure = match *check {
            NumberCheck::Integer if !(number.is_i64() || number.is_u64()) && value.fract() != 0.0 => {
                Some(("integer", structured_message("validation.integer", &[])))
            }
            NumberCheck::Min(min) if value < min => Some((
                "min_value",
                structured_message("validation.min_value", &[json!(min)]),
            )),
            NumberCheck::Max(max) if value > max => Some((
                "max_value",
                structured_message("validation.max_value", &[json!(max)]),
            )),
            _ => None,
        };
        if let Some((validation, message)) = failure {
            return Err(Issue::at(path, validation, message));
        }
    }
    Ok(NormalizedValue::Number(normalize_integral(number, value)))
}

/// Store integral floats (`30.0`) as integers so typed consumers accept them.
fn normalize_integral(number: &serde_json::Number, value: f64) -> serde_json::Number {
    if number.is_f64() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "value is integral and within the exactly representable range"
        )]
        let integral = value as i64;
        serde_json::Number::from(integral)
    } else {
        number.clone()
    }
}

fn check_picklist(allowed: &[String], value: &Value, path: &[String]) -> Result<NormalizedValue, Issue> {
    match value.as_str() {
        Some(text) if allowed.iter().any(|option| option == text) => {
            Ok(NormalizedValue::String(text.to_owned()))
        }
        _ => Err(Issue::at(
            path,
            "picklist",
            structured_message("validation.picklist", &[json!(allowed.join(", "))]),
        )),
    }
}

/// Coerce RFC 3339 timestamps, plain `YYYY-MM-DD` dates (midnight UTC) and
/// epoch milliseconds.
fn coerce_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|day| day.and_hms_opt(0, 0, 0))
                        .map(|naive| naive.and_utc())
                })
        }
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}
