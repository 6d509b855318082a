/// Record creation with relational checks
///
/// [`ResourceLinker`] owns every write that creates a record and keeps the links
/// between them sound:
///
/// - a user's email is unique
/// - an animal's owner is always the authenticated caller, and `(owner, name)` is unique
/// - a training log references an existing animal owned by the caller, and is authored
///   by the caller
///
/// Duplicate checks run before the insert to give a friendly early rejection. They are
/// not atomic with the insert; the store's unique and foreign-key constraints settle
/// concurrent writers and surface as the same `Conflict` / `NotFound` errors.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use tracing::info;
use validator::Validate;

use crate::auth::middleware::Identity;
use crate::auth::password::{hash_password_async, PasswordPolicy};
use crate::error::{field_errors, FieldError, ServiceError, ServiceResult};
use crate::models::user::{normalize_email, validate_email_domain};
use crate::models::{NewAnimal, NewTrainingLog, NewUser, RecordId};
use crate::store::Repositories;

/// Registration request body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(
        email(message = "Invalid email format"),
        custom(function = "validate_email_domain")
    )]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    /// Blob-store key of an already uploaded picture
    pub profile_picture: Option<String>,
}

/// Animal creation request body
///
/// There is deliberately no owner field; unknown fields such as `owner` are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimalRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Hours trained must not be negative"))]
    pub hours_trained: f64,

    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,

    pub profile_picture: Option<String>,
}

/// Training log creation request body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingLogRequest {
    /// Identifier of the animal trained, as a string or an integer
    #[serde(deserialize_with = "raw_identifier")]
    pub animal: String,

    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,

    #[validate(range(min = 0.0, message = "Hours must not be negative"))]
    pub hours: f64,

    /// RFC 3339 timestamp
    pub date: String,

    pub training_log_video: Option<String>,
}

/// Creates users, animals and training logs
#[derive(Clone)]
pub struct ResourceLinker {
    repos: Repositories,
    password_policy: PasswordPolicy,
}

impl ResourceLinker {
    pub fn new(repos: Repositories, password_policy: PasswordPolicy) -> Self {
        Self {
            repos,
            password_policy,
        }
    }

    /// Registers a user and returns the new identifier
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed fields
    /// - `Conflict` if the email is already registered
    pub async fn create_user(&self, mut req: CreateUserRequest) -> ServiceResult<RecordId> {
        req.email = normalize_email(&req.email);
        req.validate()?;

        let email = req.email;
        if self.repos.users.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password_async(req.password, self.password_policy).await?;

        let user = self
            .repos
            .users
            .insert_user(NewUser {
                first_name: req.first_name,
                last_name: req.last_name,
                email,
                password_hash,
                profile_picture: req.profile_picture,
            })
            .await?;

        info!(user_id = %user.id, "User created");
        Ok(user.id)
    }

    /// Registers an animal owned by `caller`
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed fields
    /// - `Conflict` if the caller already has an animal with this name
    /// - `NotFound` if the caller's user row no longer exists
    pub async fn create_animal(
        &self,
        caller: &Identity,
        req: CreateAnimalRequest,
    ) -> ServiceResult<RecordId> {
        let mut details = validation_details(&req);

        let date_of_birth = req
            .date_of_birth
            .as_deref()
            .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .transpose()
            .map_err(|_| {
                FieldError::new("dateOfBirth", "Date of birth must be formatted as YYYY-MM-DD")
            });

        let date_of_birth = match date_of_birth {
            Ok(date) if details.is_empty() => date,
            other => {
                details.extend(other.err());
                return Err(rejection(details));
            }
        };

        if self
            .repos
            .animals
            .find_animal_by_name(caller.id, &req.name)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "An animal with this name is already registered to this owner".to_string(),
            ));
        }

        let animal = self
            .repos
            .animals
            .insert_animal(NewAnimal {
                name: req.name,
                hours_trained: req.hours_trained,
                owner_id: caller.id,
                date_of_birth,
                profile_picture: req.profile_picture,
            })
            .await?;

        info!(animal_id = %animal.id, owner_id = %caller.id, "Animal created");
        Ok(animal.id)
    }

    /// Records a training session for one of the caller's animals
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed fields, including a malformed animal identifier
    /// - `NotFound` if the animal does not exist
    /// - `Forbidden` if the animal belongs to someone else
    pub async fn create_training_log(
        &self,
        caller: &Identity,
        req: CreateTrainingLogRequest,
    ) -> ServiceResult<RecordId> {
        let mut details = validation_details(&req);

        let animal_id = req
            .animal
            .parse::<RecordId>()
            .map_err(|_| FieldError::new("animal", "Animal must be a valid identifier"));
        let date = DateTime::parse_from_rfc3339(&req.date)
            .map(|date| date.with_timezone(&Utc))
            .map_err(|_| FieldError::new("date", "Date must be an RFC 3339 timestamp"));

        let (animal_id, date) = match (animal_id, date) {
            (Ok(animal_id), Ok(date)) if details.is_empty() => (animal_id, date),
            (animal_id, date) => {
                details.extend(animal_id.err());
                details.extend(date.err());
                return Err(rejection(details));
            }
        };

        let animal = self
            .repos
            .animals
            .find_animal(animal_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Animal not found".to_string()))?;

        if animal.owner_id != caller.id {
            return Err(ServiceError::Forbidden(
                "Only the animal's owner can log training for it".to_string(),
            ));
        }

        let log = self
            .repos
            .training_logs
            .insert_training_log(NewTrainingLog {
                date,
                description: req.description,
                hours: req.hours,
                animal_id: animal.id,
                user_id: caller.id,
                training_log_video: req.training_log_video,
            })
            .await?;

        info!(training_log_id = %log.id, animal_id = %animal.id, "Training log created");
        Ok(log.id)
    }
}

/// Identifier exactly as sent; parsing happens in the linker so a bad value is
/// reported against its field
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
    Text(String),
    Number(i64),
}

fn raw_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawIdentifier::deserialize(deserializer)? {
        RawIdentifier::Text(text) => text,
        RawIdentifier::Number(number) => number.to_string(),
    })
}

fn validation_details<T: Validate>(req: &T) -> Vec<FieldError> {
    match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => field_errors(&errors),
    }
}

fn rejection(mut details: Vec<FieldError>) -> ServiceError {
    details.sort_by(|a, b| a.field.cmp(&b.field));
    ServiceError::Validation(details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_body(animal: &str) -> String {
        format!(
            r#"{{"animal": {}, "description": "sit", "hours": 2, "date": "2024-09-01T10:00:00Z"}}"#,
            animal
        )
    }

    #[test]
    fn test_training_log_animal_accepts_string_or_integer() {
        let text: CreateTrainingLogRequest = serde_json::from_str(&log_body(r#""5""#)).unwrap();
        let number: CreateTrainingLogRequest = serde_json::from_str(&log_body("5")).unwrap();

        assert_eq!(text.animal, "5");
        assert_eq!(number.animal, "5");
    }

    #[test]
    fn test_non_positive_integer_animal_still_deserializes() {
        let req: CreateTrainingLogRequest = serde_json::from_str(&log_body("-3")).unwrap();
        assert!(req.animal.parse::<RecordId>().is_err());
    }

    #[test]
    fn test_create_user_rejects_undotted_email_domain() {
        let req = CreateUserRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "a@x".to_string(),
            password: "password123".to_string(),
            profile_picture: None,
        };

        let details = field_errors(&req.validate().unwrap_err());
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "email");
    }
}
