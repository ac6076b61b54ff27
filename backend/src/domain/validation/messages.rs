//! Translatable validator messages.
//!
//! Built-in checks emit structured messages: a JSON array whose first element
//! is a catalog key and whose remaining elements are template arguments, for
//! example `["validation.min_length",3]`. [`resolve_message`] turns such a
//! message into text through a [`Translator`]; anything else is returned
//! verbatim.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Encode a catalog key and its arguments as a structured message.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use userdesk::domain::validation::structured_message;
///
/// assert_eq!(
///     structured_message("validation.min_length", &[json!(3)]),
///     r#"["validation.min_length",3]"#
/// );
/// ```
pub fn structured_message(key: &str, args: &[Value]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(Value::String(key.to_owned()));
    parts.extend(args.iter().cloned());
    Value::Array(parts).to_string()
}

/// Source of localized message text.
pub trait Translator: Send + Sync {
    /// Render `key` with positional `args`, or `None` when the key is unknown.
    fn translate(&self, key: &str, args: &[Value]) -> Option<String>;
}

/// Resolve a raw issue message into display text.
///
/// Structured messages go through `translator`; when the translator has no
/// entry, or the message is not a structured array, the raw message is
/// returned unchanged.
pub fn resolve_message(raw: &str, translator: &dyn Translator) -> String {
    let Ok(Value::Array(parts)) = serde_json::from_str::<Value>(raw) else {
        return raw.to_owned();
    };
    match parts.split_first() {
        Some((Value::String(key), args)) => translator
            .translate(key, args)
            .unwrap_or_else(|| raw.to_owned()),
        _ => raw.to_owned(),
    }
}

/// Supported message locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    /// Spanish.
    #[default]
    Es,
    /// English.
    En,
}

/// Raised when a locale tag names no supported catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    /// Accepts bare languages and region-qualified tags (`es-PE`, `en_GB`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            _ => Err(UnsupportedLocale(s.to_owned())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Es => f.write_str("es"),
            Self::En => f.write_str("en"),
        }
    }
}

const SPANISH: &[(&str, &str)] = &[
    ("validation.required", "El campo es obligatorio"),
    ("validation.type", "Se esperaba un valor de tipo {0}"),
    ("validation.min_length", "Debe tener al menos {0} caracteres"),
    ("validation.max_length", "Debe tener como máximo {0} caracteres"),
    ("validation.email", "Correo electrónico inválido"),
    ("validation.pattern", "Formato inválido"),
    ("validation.integer", "Debe ser un número entero"),
    ("validation.min_value", "Debe ser mayor o igual a {0}"),
    ("validation.max_value", "Debe ser menor o igual a {0}"),
    ("validation.picklist", "Debe ser uno de: {0}"),
    ("validation.date", "Fecha inválida"),
    (
        "validation.object",
        "El cuerpo de la petición debe ser un objeto JSON",
    ),
];

const ENGLISH: &[(&str, &str)] = &[
    ("validation.required", "This field is required"),
    ("validation.type", "Expected a value of type {0}"),
    ("validation.min_length", "Must contain at least {0} characters"),
    ("validation.max_length", "Must contain at most {0} characters"),
    ("validation.email", "Invalid email address"),
    ("validation.pattern", "Invalid format"),
    ("validation.integer", "Must be an integer"),
    ("validation.min_value", "Must be greater than or equal to {0}"),
    ("validation.max_value", "Must be less than or equal to {0}"),
    ("validation.picklist", "Must be one of: {0}"),
    ("validation.date", "Invalid date"),
    ("validation.object", "Request body must be a JSON object"),
];

/// In-memory message catalog for one locale.
///
/// Templates use `{0}`, `{1}`, ... placeholders filled from the structured
/// message arguments.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    locale: Locale,
    entries: HashMap<String, String>,
}

impl MessageCatalog {
    /// Built-in catalog for `locale`.
    pub fn builtin(locale: Locale) -> Self {
        let source = match locale {
            Locale::Es => SPANISH,
            Locale::En => ENGLISH,
        };
        Self {
            locale,
            entries: source
                .iter()
                .map(|(key, template)| ((*key).to_owned(), (*template).to_owned()))
                .collect(),
        }
    }

    /// Override or add a template.
    pub fn with_entry(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.entries.insert(key.into(), template.into());
        self
    }

    /// Locale served by this catalog.
    pub fn locale(&self) -> Locale {
        self.locale
    }
}

fn render_arg(arg: &Value) -> String {
    match arg {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, key: &str, args: &[Value]) -> Option<String> {
        let template = self.entries.get(key)?;
        let rendered = args
            .iter()
            .enumerate()
            .fold(template.clone(), |text, (index, arg)| {
                text.replace(&format!("{{{index}}}"), &render_arg(arg))
            });
        Some(rendered)
    }
}

/// Picks a catalog per request from an `Accept-Language` header.
#[derive(Debug, Clone)]
pub struct Localizer {
    fallback: Locale,
    spanish: MessageCatalog,
    english: MessageCatalog,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl Localizer {
    /// Localizer using the built-in catalogs and `fallback` when the client
    /// expresses no supported preference.
    pub fn new(fallback: Locale) -> Self {
        Self {
            fallback,
            spanish: MessageCatalog::builtin(Locale::Es),
            english: MessageCatalog::builtin(Locale::En),
        }
    }

    /// Catalog for a specific locale.
    pub fn catalog(&self, locale: Locale) -> &MessageCatalog {
        match locale {
            Locale::Es => &self.spanish,
            Locale::En => &self.english,
        }
    }

    /// Catalog matching the first supported language in `accept_language`.
    ///
    /// Quality weights are ignored; tags are taken in the order given.
    pub fn for_accept_language(&self, accept_language: Option<&str>) -> &MessageCatalog {
        let preferred = accept_language.and_then(|header| {
            header
                .split(',')
                .filter_map(|tag| tag.split(';').next())
                .find_map(|tag| tag.parse::<Locale>().ok())
        });
        self.catalog(preferred.unwrap_or(self.fallback))
    }
}
