//! Request schemas for the user resource.

use super::user::Gender;
use super::validation::{Schema, boolean, date, number, picklist, string};

/// Message shown when a password is too weak.
pub const PASSWORD_MESSAGE: &str = "Contraseña debe tener al menos 8 caracteres, una letra mayúscula, una letra minúscula, un número y un carácter especial";

const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// At least eight characters drawn from letters, digits and `@$!%*?&`, with
/// at least one of each class.
pub fn is_strong_password(candidate: &str) -> bool {
    let allowed = candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    allowed
        && candidate.chars().count() >= 8
        && candidate.chars().any(|c| c.is_ascii_lowercase())
        && candidate.chars().any(|c| c.is_ascii_uppercase())
        && candidate.chars().any(|c| c.is_ascii_digit())
        && candidate.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

fn bounded_text() -> super::validation::StringRule {
    string().min_length(3).max_length(255)
}

/// Full user shape, including the identifier.
pub fn user_schema() -> Schema {
    Schema::new()
        .field("id", number().integer())
        .field("name", bounded_text())
        .field("lastname", bounded_text())
        .field("age", number().integer())
        .field("email", string().email())
        .field(
            "password",
            string()
                .raw()
                .predicate("regex", PASSWORD_MESSAGE, is_strong_password),
        )
        .field(
            "address",
            Schema::new()
                .field("street", bounded_text())
                .field("city", bounded_text())
                .field("state", bounded_text())
                .field("zip", bounded_text()),
        )
        .field("genero", picklist(Gender::VALUES))
        .field("fecha", date())
        .field("estado", boolean())
}

/// Create request: everything but the identifier.
pub fn user_store_schema() -> Schema {
    user_schema().omit(&["id"])
}

/// Update request: any subset of the create fields.
pub fn user_update_schema() -> Schema {
    user_store_schema().partial()
}
