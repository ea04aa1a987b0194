use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::User;
use crate::validation::{char_len, is_valid_email, raw, Input, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Body of `/auth/register` and `/auth/login`. Fields are raw JSON so that
/// a missing or mistyped field is reported per field rather than as a parse failure.
#[derive(Default, Deserialize)]
pub struct CredentialsBody {
    #[serde(default, deserialize_with = "raw")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "raw")]
    pub password: Option<Value>,
}

/// Validated email/password pair.
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialsBody {
    pub fn validate(self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = match Input::from(self.email) {
            Input::Text(email) if is_valid_email(&email) => email,
            _ => {
                errors.add("email", "Invalid email format");
                String::new()
            }
        };

        let password = match Input::from(self.password) {
            Input::Text(p) => {
                if char_len(&p) < MIN_PASSWORD_LEN {
                    errors.add("password", "Password must be at least 6 characters long");
                }
                p
            }
            Input::Missing | Input::NotText => {
                errors.add("password", "Password is required");
                String::new()
            }
        };

        errors.finish(Credentials { email, password })
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

/// Response returned after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(email: Option<&str>, password: Option<&str>) -> CredentialsBody {
        CredentialsBody {
            email: email.map(Into::into),
            password: password.map(Into::into),
        }
    }

    #[test]
    fn accepts_valid_credentials() {
        let creds = body(Some("user@mail.com"), Some("password1")).validate().unwrap();
        assert_eq!(creds.email, "user@mail.com");
        assert_eq!(creds.password, "password1");
    }

    #[test]
    fn keeps_email_as_sent() {
        let creds = body(Some("User@Mail.com"), Some("password1")).validate().unwrap();
        assert_eq!(creds.email, "User@Mail.com");
    }

    #[test]
    fn reports_every_bad_field() {
        let errors = body(Some(""), Some("weak")).validate().unwrap_err();
        assert_eq!(errors.field("email").unwrap(), ["Invalid email format"]);
        assert_eq!(
            errors.field("password").unwrap(),
            ["Password must be at least 6 characters long"]
        );
    }

    #[test]
    fn missing_fields() {
        let errors = CredentialsBody::default().validate().unwrap_err();
        assert_eq!(errors.field("email").unwrap(), ["Invalid email format"]);
        assert_eq!(errors.field("password").unwrap(), ["Password is required"]);
    }

    #[test]
    fn mistyped_fields_are_reported_per_field() {
        let body: CredentialsBody =
            serde_json::from_value(serde_json::json!({ "email": 5, "password": ["password1"] })).unwrap();
        let errors = body.validate().unwrap_err();
        assert_eq!(errors.field("email").unwrap(), ["Invalid email format"]);
        assert_eq!(errors.field("password").unwrap(), ["Password is required"]);

        let body: CredentialsBody =
            serde_json::from_value(serde_json::json!({ "email": null, "password": null })).unwrap();
        let errors = body.validate().unwrap_err();
        assert_eq!(errors.field("email").unwrap(), ["Invalid email format"]);
        assert_eq!(errors.field("password").unwrap(), ["Password is required"]);
    }

    #[test]
    fn debug_redacts_password() {
        let creds = body(Some("user@mail.com"), Some("hunter22")).validate().unwrap();
        assert!(!format!("{creds:?}").contains("hunter22"));
    }

    #[test]
    fn login_response_uses_camel_case_token() {
        let res = LoginResponse {
            access_token: "abc".into(),
            user: PublicUser {
                id: Uuid::nil(),
                email: "test@example.com".into(),
                created_at: OffsetDateTime::UNIX_EPOCH,
            },
        };
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["accessToken"], "abc");
        assert_eq!(json["user"]["email"], "test@example.com");
        assert!(json["user"].get("password_hash").is_none());
    }
}
