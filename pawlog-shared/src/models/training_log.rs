/// Training log model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE training_logs (
///     id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
///     date TIMESTAMPTZ NOT NULL,
///     description TEXT NOT NULL,
///     hours DOUBLE PRECISION NOT NULL,
///     animal_id BIGINT NOT NULL REFERENCES animals (id),
///     user_id BIGINT NOT NULL REFERENCES users (id),
///     training_log_video VARCHAR(1024),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     FOREIGN KEY (animal_id, user_id) REFERENCES animals (id, owner_id)
/// );
/// ```
///
/// The composite foreign key mirrors the ownership chain: `user_id` must be the owner
/// of `animal_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::animal::Animal;
use super::id::RecordId;
use super::user::UserProfile;

/// Dated training session for one animal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrainingLog {
    pub id: RecordId,

    pub date: DateTime<Utc>,

    pub description: String,

    pub hours: f64,

    #[serde(rename = "animal")]
    pub animal_id: RecordId,

    /// Author; always the animal's owner
    #[serde(rename = "user")]
    pub user_id: RecordId,

    /// Blob-store key of the session video
    pub training_log_video: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for inserting a training log row
#[derive(Debug, Clone)]
pub struct NewTrainingLog {
    pub date: DateTime<Utc>,
    pub description: String,
    pub hours: f64,
    pub animal_id: RecordId,
    pub user_id: RecordId,
    pub training_log_video: Option<String>,
}

/// Training log listing item with the animal and author resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingLogListing {
    pub id: RecordId,
    pub date: DateTime<Utc>,
    pub description: String,
    pub hours: f64,
    pub animal: Animal,
    pub user: UserProfile,
    pub training_log_video: Option<String>,
}

impl TrainingLogListing {
    pub fn new(log: TrainingLog, animal: Animal, user: UserProfile) -> Self {
        Self {
            id: log.id,
            date: log.date,
            description: log.description,
            hours: log.hours,
            animal,
            user,
            training_log_video: log.training_log_video,
        }
    }
}
