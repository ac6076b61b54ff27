//! Serialization contract and patch semantics for users.

use super::*;
use crate::test_support::{sample_address, sample_user};
use rstest::rstest;
use serde_json::json;

#[rstest]
fn user_serializes_with_api_field_names() {
    let value = serde_json::to_value(sample_user(7, "ada@example.com")).expect("serialize");
    assert_eq!(value["id"], json!(7));
    assert_eq!(value["genero"], json!("femenino"));
    assert_eq!(value["estado"], json!(true));
    assert!(value.get("fecha").is_some());
    assert!(value.get("createdAt").is_some());
}

#[rstest]
fn password_hash_is_never_serialized() {
    let value = serde_json::to_value(sample_user(1, "ada@example.com")).expect("serialize");
    let object = value.as_object().expect("object");
    assert!(!object.contains_key("password"));
    assert!(!object.contains_key("passwordHash"));
}

#[rstest]
fn draft_reads_api_field_names() {
    let draft: UserDraft = serde_json::from_value(json!({
        "name": "Ada",
        "lastname": "Lovelace",
        "age": 36,
        "email": "ada@example.com",
        "password": "S3cret!pass",
        "address": { "street": "Main", "city": "Lima", "state": "Lima", "zip": "15001" },
        "genero": "femenino",
        "fecha": "2024-03-01T00:00:00.000Z",
        "estado": true
    }))
    .expect("valid draft");
    assert_eq!(draft.gender, Gender::Femenino);
    assert!(draft.active);
}

#[rstest]
fn changes_default_missing_fields_to_none() {
    let changes: UserChanges = serde_json::from_value(json!({ "estado": false })).expect("valid");
    assert_eq!(
        changes,
        UserChanges {
            active: Some(false),
            ..UserChanges::default()
        }
    );
}

#[rstest]
fn patch_only_touches_present_fields() {
    let mut user = sample_user(3, "ada@example.com");
    let before = user.clone();
    UserPatch {
        lastname: Some("Byron".into()),
        address: Some(Address {
            city: "Cusco".into(),
            ..sample_address()
        }),
        ..UserPatch::default()
    }
    .apply_to(&mut user);
    assert_eq!(user.lastname, "Byron");
    assert_eq!(user.address.city, "Cusco");
    assert_eq!(user.name, before.name);
    assert_eq!(user.email, before.email);
    assert_eq!(user.password_hash, before.password_hash);
}

#[rstest]
fn gender_values_match_serde_names() {
    for gender in [Gender::Masculino, Gender::Femenino] {
        assert_eq!(
            serde_json::to_value(gender).expect("serialize"),
            json!(gender.as_str())
        );
        assert!(Gender::VALUES.contains(&gender.as_str()));
    }
}
