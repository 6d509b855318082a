/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Registration, credential check and token issuance
/// - `animals`: Animal creation
/// - `training`: Training log creation
/// - `admin`: Paginated listings
/// - `files`: Upload and attach

pub mod admin;
pub mod animals;
pub mod files;
pub mod health;
pub mod training;
pub mod users;

use pawlog_shared::models::RecordId;
use serde::{Deserialize, Serialize};

/// Response for record-creating endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,

    /// Identifier of the new record
    pub id: RecordId,
}

impl CreatedResponse {
    pub fn new(message: &str, id: RecordId) -> Self {
        Self {
            message: message.to_string(),
            id,
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
