/// Animal model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE animals (
///     id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     hours_trained DOUBLE PRECISION NOT NULL,   -- CHECK (hours_trained >= 0)
///     owner_id BIGINT NOT NULL REFERENCES users (id),
///     date_of_birth DATE,
///     profile_picture VARCHAR(1024),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (owner_id, name)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::RecordId;
use super::user::UserProfile;

/// Animal registered by its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: RecordId,

    pub name: String,

    /// Accumulated training hours, never negative
    pub hours_trained: f64,

    /// Owning user
    #[serde(rename = "owner")]
    pub owner_id: RecordId,

    pub date_of_birth: Option<NaiveDate>,

    /// Blob-store key of the profile picture
    pub profile_picture: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for inserting an animal row
#[derive(Debug, Clone)]
pub struct NewAnimal {
    pub name: String,
    pub hours_trained: f64,
    pub owner_id: RecordId,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
}

/// Animal listing item with the owner resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalListing {
    pub id: RecordId,
    pub name: String,
    pub hours_trained: f64,
    pub owner: UserProfile,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
}

impl AnimalListing {
    pub fn new(animal: Animal, owner: UserProfile) -> Self {
        Self {
            id: animal.id,
            name: animal.name,
            hours_trained: animal.hours_trained,
            owner,
            date_of_birth: animal.date_of_birth,
            profile_picture: animal.profile_picture,
        }
    }
}
