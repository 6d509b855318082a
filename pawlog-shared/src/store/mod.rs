/// Repository interfaces
///
/// The core services never touch a connection pool directly. They hold a
/// [`Repositories`] bundle built once at startup and call the async traits below.
///
/// # Implementations
///
/// - [`postgres::PgRepository`]: sqlx / PostgreSQL, constraints declared in `migrations/`
/// - [`memory::MemoryRepository`]: in-process maps with the same constraints, used by
///   tests and local runs
///
/// # Constraints
///
/// Both implementations enforce uniqueness and references themselves and report
/// violations as [`StoreError::UniqueViolation`] / [`StoreError::ForeignKeyViolation`]
/// carrying the constraint name. Application-level pre-checks are advisory only:
/// two concurrent inserts can both pass them, and the store settles the race.
///
/// # Keyset paging
///
/// `page_after(after, limit)` returns rows with `id > after` in ascending id order.
/// When `after` names a row that does not exist, the page is empty.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{
    Animal, NewAnimal, NewTrainingLog, NewUser, RecordId, TrainingLog, User,
};

pub mod memory;
pub mod postgres;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign-key constraint rejected the write
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Stored data breaks an invariant the store should have kept
    #[error("Corrupted data: {0}")]
    Corrupted(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();

            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }

        StoreError::Database(err)
    }
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; `users_email_key` guards email uniqueness
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user(&self, id: RecordId) -> StoreResult<Option<User>>;

    /// Looks up by normalized email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Fetches every user whose id is in `ids` (unordered, missing ids skipped)
    async fn find_users(&self, ids: &[RecordId]) -> StoreResult<Vec<User>>;

    async fn page_users(&self, after: Option<RecordId>, limit: i64) -> StoreResult<Vec<User>>;

    /// Replaces the profile picture key
    ///
    /// Returns `None` if the user does not exist, otherwise `Some(previous_key)`.
    async fn set_user_picture(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>>;
}

/// Animal persistence
#[async_trait]
pub trait AnimalStore: Send + Sync {
    /// Inserts an animal; `animals_owner_name_key` guards `(owner, name)` uniqueness
    async fn insert_animal(&self, animal: NewAnimal) -> StoreResult<Animal>;

    async fn find_animal(&self, id: RecordId) -> StoreResult<Option<Animal>>;

    async fn find_animal_by_name(
        &self,
        owner_id: RecordId,
        name: &str,
    ) -> StoreResult<Option<Animal>>;

    async fn find_animals(&self, ids: &[RecordId]) -> StoreResult<Vec<Animal>>;

    async fn page_animals(&self, after: Option<RecordId>, limit: i64)
        -> StoreResult<Vec<Animal>>;

    /// Same contract as [`UserStore::set_user_picture`]
    async fn set_animal_picture(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>>;
}

/// Training log persistence
#[async_trait]
pub trait TrainingLogStore: Send + Sync {
    /// Inserts a log; the store rejects a `user_id` that does not own `animal_id`
    async fn insert_training_log(&self, log: NewTrainingLog) -> StoreResult<TrainingLog>;

    async fn find_training_log(&self, id: RecordId) -> StoreResult<Option<TrainingLog>>;

    async fn page_training_logs(
        &self,
        after: Option<RecordId>,
        limit: i64,
    ) -> StoreResult<Vec<TrainingLog>>;

    /// Same contract as [`UserStore::set_user_picture`], for the video key
    async fn set_training_log_video(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>>;
}

/// Liveness probe for the backing store
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

/// Repository handles injected into the core services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
    pub animals: Arc<dyn AnimalStore>,
    pub training_logs: Arc<dyn TrainingLogStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    /// Uses one backend for every collection
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + AnimalStore + TrainingLogStore + StoreHealth + 'static,
    {
        Self {
            users: backend.clone(),
            animals: backend.clone(),
            training_logs: backend.clone(),
            health: backend,
        }
    }
}
