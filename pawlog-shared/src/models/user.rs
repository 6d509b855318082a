/// User model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     email VARCHAR(320) NOT NULL,          -- users_email_key UNIQUE
///     password_hash VARCHAR(255) NOT NULL,
///     profile_picture VARCHAR(1024),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The password hash never leaves the service: it is skipped on serialization and the
/// listing surfaces use [`UserProfile`] / [`UserSummary`] instead of the full row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::ValidationError;

use super::id::RecordId;

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Creation-ordered identifier
    pub id: RecordId,

    pub first_name: String,

    pub last_name: String,

    /// Normalized (trimmed, lower-case) email address, unique across users
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Blob-store key of the profile picture
    pub profile_picture: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for inserting a user row
///
/// Carries the password *hash*; plaintext never reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
}

/// Safe projection of a user embedded in other records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

/// User listing item: the safe projection plus the identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: RecordId,

    #[serde(flatten)]
    pub profile: UserProfile,
}

impl User {
    /// Projects the user without credentials
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            profile: self.profile(),
        }
    }
}

/// Normalizes an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Requires a dot inside the domain part, e.g. rejects `a@x`
///
/// Addresses without an `@` pass here and are left to the email shape check.
pub fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return Ok(());
    };

    let dotted = domain
        .split_once('.')
        .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty());
    if dotted {
        return Ok(());
    }

    let mut error = ValidationError::new("email_domain");
    error.message = Some(Cow::Borrowed("Email domain must contain a dot"));
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: RecordId::new(7).unwrap(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            profile_picture: Some("ada.png-1700000000000-0a1b2c3d".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_email_domain_needs_a_dot() {
        assert!(validate_email_domain("ada@example.com").is_ok());
        assert!(validate_email_domain("ada@mail.example.org").is_ok());
        assert!(validate_email_domain("not-an-email").is_ok());

        assert!(validate_email_domain("a@x").is_err());
        assert!(validate_email_domain("a@.com").is_err());
        assert!(validate_email_domain("a@x.").is_err());
    }

    #[test]
    fn test_serialization_omits_password_hash() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["id"], "7");
        assert_eq!(json["firstName"], "Ada");
    }

    #[test]
    fn test_summary_projection() {
        let json = serde_json::to_value(sample().summary()).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();

        assert_eq!(keys.len(), 5);
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["profilePicture"], "ada.png-1700000000000-0a1b2c3d");
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }
}
