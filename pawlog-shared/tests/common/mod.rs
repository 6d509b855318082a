//! Shared helpers for the pawlog-shared integration tests
//!
//! Everything runs against the in-memory repository and blob store.

#![allow(dead_code)]

use pawlog_shared::auth::middleware::Identity;
use pawlog_shared::auth::password::PasswordPolicy;
use pawlog_shared::blob::{BlobUploadCoordinator, MemoryBlobStore};
use pawlog_shared::linker::{
    CreateAnimalRequest, CreateTrainingLogRequest, CreateUserRequest, ResourceLinker,
};
use pawlog_shared::models::RecordId;
use pawlog_shared::pagination::Paginator;
use pawlog_shared::store::{memory::MemoryRepository, Repositories};
use std::sync::Arc;

/// Argon2 parameters cheap enough for tests
pub fn cheap_policy() -> PasswordPolicy {
    PasswordPolicy {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub struct Harness {
    pub repos: Repositories,
    pub linker: ResourceLinker,
    pub paginator: Paginator,
    pub uploads: BlobUploadCoordinator,
    pub blobs: Arc<MemoryBlobStore>,
}

impl Harness {
    pub fn new() -> Self {
        let repos = Repositories::from_backend(Arc::new(MemoryRepository::new()));
        let blobs = Arc::new(MemoryBlobStore::new());

        Self {
            linker: ResourceLinker::new(repos.clone(), cheap_policy()),
            paginator: Paginator::new(repos.clone()),
            uploads: BlobUploadCoordinator::new(repos.clone(), blobs.clone()),
            blobs,
            repos,
        }
    }

    /// Registers a user and returns the identity a token for them would carry
    pub async fn register(&self, email: &str) -> Identity {
        let id = self
            .linker
            .create_user(user_request(email))
            .await
            .expect("Failed to create user");

        let user = self
            .repos
            .users
            .find_user(id)
            .await
            .unwrap()
            .expect("User should exist");

        Identity::from(&user)
    }

    pub async fn add_animal(&self, owner: &Identity, name: &str) -> RecordId {
        self.linker
            .create_animal(owner, animal_request(name))
            .await
            .expect("Failed to create animal")
    }

    pub async fn add_log(&self, author: &Identity, animal: RecordId, hours: f64) -> RecordId {
        self.linker
            .create_training_log(author, log_request(&animal.to_string(), hours))
            .await
            .expect("Failed to create training log")
    }
}

pub fn user_request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        profile_picture: None,
    }
}

pub fn animal_request(name: &str) -> CreateAnimalRequest {
    CreateAnimalRequest {
        name: name.to_string(),
        hours_trained: 0.0,
        date_of_birth: Some("2021-04-01".to_string()),
        profile_picture: None,
    }
}

pub fn log_request(animal: &str, hours: f64) -> CreateTrainingLogRequest {
    CreateTrainingLogRequest {
        animal: animal.to_string(),
        description: "Practiced loose-leash walking".to_string(),
        hours,
        date: "2024-03-01T10:00:00Z".to_string(),
        training_log_video: None,
    }
}
