/// In-memory repository
///
/// Keeps every collection in a `BTreeMap` keyed by [`RecordId`] behind one async
/// `RwLock`. Identifiers come from a single process-wide counter, so they are strictly
/// increasing in creation order across all three collections, like the identity
/// columns of the PostgreSQL schema are within each table.
///
/// The same constraints as the SQL schema are enforced (and reported under the same
/// constraint names), which keeps service behaviour identical across backends.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::ops::Bound;
use tokio::sync::RwLock;

use super::{
    AnimalStore, StoreError, StoreHealth, StoreResult, TrainingLogStore, UserStore,
};
use crate::models::{
    Animal, NewAnimal, NewTrainingLog, NewUser, RecordId, TrainingLog, User,
};

#[derive(Debug, Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<RecordId, User>,
    animals: BTreeMap<RecordId, Animal>,
    training_logs: BTreeMap<RecordId, TrainingLog>,
}

impl Tables {
    fn next_id(&mut self) -> StoreResult<RecordId> {
        self.last_id += 1;
        RecordId::new(self.last_id)
            .ok_or_else(|| StoreError::Corrupted("identifier counter overflowed".to_string()))
    }
}

/// Repository held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Rows strictly after `after`, at most `limit`; empty when the cursor row is unknown
fn page<T: Clone>(
    rows: &BTreeMap<RecordId, T>,
    after: Option<RecordId>,
    limit: i64,
) -> Vec<T> {
    let take = usize::try_from(limit).unwrap_or(0);

    match after {
        None => rows.values().take(take).cloned().collect(),
        Some(cursor) if rows.contains_key(&cursor) => rows
            .range((Bound::Excluded(cursor), Bound::Unbounded))
            .map(|(_, row)| row)
            .take(take)
            .cloned()
            .collect(),
        Some(_) => vec![],
    }
}

fn replace<T>(
    rows: &mut BTreeMap<RecordId, T>,
    id: RecordId,
    field: impl FnOnce(&mut T) -> &mut Option<String>,
    key: &str,
) -> Option<Option<String>> {
    rows.get_mut(&id)
        .map(|row| field(row).replace(key.to_string()))
}

#[async_trait]
impl UserStore for MemoryRepository {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let row = User {
            id: tables.next_id()?,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            profile_picture: user.profile_picture,
            created_at: Utc::now(),
        };
        tables.users.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_user(&self, id: RecordId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[RecordId]) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
    }

    async fn page_users(&self, after: Option<RecordId>, limit: i64) -> StoreResult<Vec<User>> {
        Ok(page(&self.tables.read().await.users, after, limit))
    }

    async fn set_user_picture(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>> {
        let mut tables = self.tables.write().await;
        Ok(replace(&mut tables.users, id, |u| &mut u.profile_picture, key))
    }
}

#[async_trait]
impl AnimalStore for MemoryRepository {
    async fn insert_animal(&self, animal: NewAnimal) -> StoreResult<Animal> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&animal.owner_id) {
            return Err(StoreError::ForeignKeyViolation("animals_owner_id_fkey".to_string()));
        }
        if tables
            .animals
            .values()
            .any(|a| a.owner_id == animal.owner_id && a.name == animal.name)
        {
            return Err(StoreError::UniqueViolation("animals_owner_name_key".to_string()));
        }

        let row = Animal {
            id: tables.next_id()?,
            name: animal.name,
            hours_trained: animal.hours_trained,
            owner_id: animal.owner_id,
            date_of_birth: animal.date_of_birth,
            profile_picture: animal.profile_picture,
            created_at: Utc::now(),
        };
        tables.animals.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_animal(&self, id: RecordId) -> StoreResult<Option<Animal>> {
        Ok(self.tables.read().await.animals.get(&id).cloned())
    }

    async fn find_animal_by_name(
        &self,
        owner_id: RecordId,
        name: &str,
    ) -> StoreResult<Option<Animal>> {
        let tables = self.tables.read().await;
        Ok(tables
            .animals
            .values()
            .find(|a| a.owner_id == owner_id && a.name == name)
            .cloned())
    }

    async fn find_animals(&self, ids: &[RecordId]) -> StoreResult<Vec<Animal>> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.animals.get(id).cloned()).collect())
    }

    async fn page_animals(
        &self,
        after: Option<RecordId>,
        limit: i64,
    ) -> StoreResult<Vec<Animal>> {
        Ok(page(&self.tables.read().await.animals, after, limit))
    }

    async fn set_animal_picture(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>> {
        let mut tables = self.tables.write().await;
        Ok(replace(&mut tables.animals, id, |a| &mut a.profile_picture, key))
    }
}

#[async_trait]
impl TrainingLogStore for MemoryRepository {
    async fn insert_training_log(&self, log: NewTrainingLog) -> StoreResult<TrainingLog> {
        let mut tables = self.tables.write().await;

        let owner = tables
            .animals
            .get(&log.animal_id)
            .map(|a| a.owner_id)
            .ok_or_else(|| {
                StoreError::ForeignKeyViolation("training_logs_animal_id_fkey".to_string())
            })?;
        if !tables.users.contains_key(&log.user_id) {
            return Err(StoreError::ForeignKeyViolation(
                "training_logs_user_id_fkey".to_string(),
            ));
        }
        if owner != log.user_id {
            return Err(StoreError::ForeignKeyViolation(
                "training_logs_animal_owner_fkey".to_string(),
            ));
        }

        let row = TrainingLog {
            id: tables.next_id()?,
            date: log.date,
            description: log.description,
            hours: log.hours,
            animal_id: log.animal_id,
            user_id: log.user_id,
            training_log_video: log.training_log_video,
            created_at: Utc::now(),
        };
        tables.training_logs.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_training_log(&self, id: RecordId) -> StoreResult<Option<TrainingLog>> {
        Ok(self.tables.read().await.training_logs.get(&id).cloned())
    }

    async fn page_training_logs(
        &self,
        after: Option<RecordId>,
        limit: i64,
    ) -> StoreResult<Vec<TrainingLog>> {
        Ok(page(&self.tables.read().await.training_logs, after, limit))
    }

    async fn set_training_log_video(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>> {
        let mut tables = self.tables.write().await;
        Ok(replace(
            &mut tables.training_logs,
            id,
            |t| &mut t.training_log_video,
            key,
        ))
    }
}

#[async_trait]
impl StoreHealth for MemoryRepository {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
