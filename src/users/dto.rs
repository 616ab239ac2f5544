use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::users::repo_types::NewUser;

/// Email shape accepted by the API. Also published as the schema `pattern`.
pub const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN compiles");
}

fn trimmed<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw.trim().to_string())
}

fn trimmed_lowercase<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw.trim().to_lowercase())
}

/// Request body for create and update. Drives both validation and the
/// OpenAPI schema. Values are trimmed (and the email lowercased) while
/// deserializing, so validation sees the stored form.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserInput {
    #[serde(deserialize_with = "trimmed")]
    #[schema(example = "Ana")]
    pub name: String,
    #[serde(deserialize_with = "trimmed_lowercase")]
    #[validate(regex(path = *EMAIL_RE, message = "must be a valid email address"))]
    #[schema(pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$", example = "ana@x.com")]
    pub email: String,
}

impl UserInput {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
        }
    }
}

/// Body of responses that carry no record.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct EmptyData {}

/// Flattens validator output into `field: message; field: message`, sorted by field.
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::{schema::Schema, RefOr};
    use utoipa::PartialSchema;

    fn input(name: &str, email: &str) -> UserInput {
        UserInput {
            name: name.into(),
            email: email.into(),
        }
    }

    #[test]
    fn normalizes_while_deserializing() {
        let user: UserInput =
            serde_json::from_str(r#"{"name":"  Ana ","email":" Ana@X.com "}"#).unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@x.com");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["", "ana", "ana@x", "ana @x.com", "@x.com"] {
            let errors = input("Ana", bad).validate().unwrap_err();
            assert_eq!(
                describe_validation(&errors),
                "email: must be a valid email address",
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn name_has_no_format_constraint() {
        assert!(input("", "ana@x.com").validate().is_ok());
    }

    #[test]
    fn missing_field_fails_to_deserialize() {
        let res = serde_json::from_str::<UserInput>(r#"{"name":"Ana"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn documented_pattern_matches_validator() {
        let RefOr::T(Schema::Object(obj)) = UserInput::schema() else {
            panic!("expected object schema");
        };
        let Some(RefOr::T(Schema::Object(email))) = obj.properties.get("email") else {
            panic!("expected email property");
        };
        assert_eq!(email.pattern.as_deref(), Some(EMAIL_PATTERN));
        assert!(obj.required.iter().any(|f| f == "name"));
        assert!(obj.required.iter().any(|f| f == "email"));
    }

    #[test]
    fn empty_data_serializes_as_empty_object() {
        assert_eq!(serde_json::to_string(&EmptyData::default()).unwrap(), "{}");
    }
}
