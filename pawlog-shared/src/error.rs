/// Service error taxonomy
///
/// Every core operation returns [`ServiceResult`]. The variants separate client-caused
/// failures (validation, credentials, conflicts, dangling references, ownership) from
/// internal faults, so the HTTP layer can map each kind to its own status code.

use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Offending field of a rejected request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as it appears in the JSON body
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for core operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing input
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Out-of-range operation argument (e.g. a non-positive page limit)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing or rejected credentials
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Dangling reference
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ownership violation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unexpected storage or runtime fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Validation failure for a single field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

/// Flattens validator output into `{field, message}` entries with camelCase field names
pub fn field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            let field = to_camel_case(&field.to_string());
            errors.iter().map(move |error| {
                FieldError::new(
                    field.clone(),
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                )
            })
        })
        .collect();

    // HashMap iteration order is arbitrary
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                ServiceError::Conflict(conflict_message(&constraint).to_string())
            }
            StoreError::ForeignKeyViolation(constraint) => {
                ServiceError::NotFound(dangling_reference_message(&constraint).to_string())
            }
            StoreError::Database(e) => ServiceError::Internal(format!("Database error: {}", e)),
            StoreError::Corrupted(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "users_email_key" => "Email already registered",
        "animals_owner_name_key" => "An animal with this name is already registered to this owner",
        _ => "Record already exists",
    }
}

fn dangling_reference_message(constraint: &str) -> &'static str {
    match constraint {
        "animals_owner_id_fkey" | "training_logs_user_id_fkey" => "User not found",
        "training_logs_animal_id_fkey" => "Animal not found",
        // Composite key: the animal exists but belongs to someone else, or vanished.
        "training_logs_animal_owner_fkey" => "Animal not found for this owner",
        _ => "Referenced record not found",
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;

    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "First name is required"))]
        first_name: String,

        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[test]
    fn test_validation_errors_carry_camel_case_fields() {
        let sample = Sample {
            first_name: String::new(),
            email: "not-an-email".to_string(),
        };

        let err = ServiceError::from(sample.validate().unwrap_err());
        match err {
            ServiceError::Validation(details) => {
                assert_eq!(
                    details,
                    vec![
                        FieldError::new("email", "Invalid email format"),
                        FieldError::new("firstName", "First name is required"),
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_store_errors_map_to_client_kinds() {
        let conflict = ServiceError::from(StoreError::UniqueViolation("users_email_key".into()));
        assert!(matches!(conflict, ServiceError::Conflict(ref m) if m == "Email already registered"));

        let missing =
            ServiceError::from(StoreError::ForeignKeyViolation("animals_owner_id_fkey".into()));
        assert!(matches!(missing, ServiceError::NotFound(_)));

        let internal = ServiceError::from(StoreError::Corrupted("boom".into()));
        assert!(matches!(internal, ServiceError::Internal(_)));
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("hours_trained"), "hoursTrained");
        assert_eq!(to_camel_case("training_log_video"), "trainingLogVideo");
        assert_eq!(to_camel_case("email"), "email");
    }
}
