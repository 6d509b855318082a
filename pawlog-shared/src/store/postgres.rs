/// PostgreSQL repository
///
/// Implements every repository trait over a single `PgPool`. Constraint names used in
/// error mapping come from the migrations in `migrations/`.
///
/// # Example
///
/// ```no_run
/// use pawlog_shared::db::pool::{create_pool, DatabaseConfig};
/// use pawlog_shared::store::{postgres::PgRepository, Repositories};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let repos = Repositories::from_backend(Arc::new(PgRepository::new(pool)));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    AnimalStore, StoreHealth, StoreResult, TrainingLogStore, UserStore,
};
use crate::models::{
    Animal, NewAnimal, NewTrainingLog, NewUser, RecordId, TrainingLog, User,
};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, profile_picture, created_at";

const ANIMAL_COLUMNS: &str =
    "id, name, hours_trained, owner_id, date_of_birth, profile_picture, created_at";

const TRAINING_LOG_COLUMNS: &str =
    "id, date, description, hours, animal_id, user_id, training_log_video, created_at";

/// Repository backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Keyset page query over `table`
///
/// An unknown cursor matches nothing because of the `EXISTS` guard.
fn page_query(table: &str, columns: &str) -> String {
    format!(
        r#"
        SELECT {columns}
        FROM {table}
        WHERE $1::BIGINT IS NULL
           OR (id > $1 AND EXISTS (SELECT 1 FROM {table} cursor_row WHERE cursor_row.id = $1))
        ORDER BY id ASC
        LIMIT $2
        "#
    )
}

/// Key replacement that also returns the previous key
fn replace_key_query(table: &str, column: &str) -> String {
    format!(
        r#"
        UPDATE {table} target
        SET {column} = $2
        FROM (SELECT id, {column} AS previous FROM {table} WHERE id = $1 FOR UPDATE) old
        WHERE target.id = old.id
        RETURNING old.previous
        "#
    )
}

fn raw_ids(ids: &[RecordId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

#[async_trait]
impl UserStore for PgRepository {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, profile_picture)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, User>(&query)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.profile_picture)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_user(&self, id: RecordId) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let row = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_users(&self, ids: &[RecordId]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");

        let rows = sqlx::query_as::<_, User>(&query)
            .bind(raw_ids(ids))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn page_users(&self, after: Option<RecordId>, limit: i64) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&page_query("users", USER_COLUMNS))
            .bind(after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn set_user_picture(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>> {
        let previous: Option<(Option<String>,)> =
            sqlx::query_as(&replace_key_query("users", "profile_picture"))
                .bind(id)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(previous.map(|(key,)| key))
    }
}

#[async_trait]
impl AnimalStore for PgRepository {
    async fn insert_animal(&self, animal: NewAnimal) -> StoreResult<Animal> {
        let query = format!(
            r#"
            INSERT INTO animals (name, hours_trained, owner_id, date_of_birth, profile_picture)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ANIMAL_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Animal>(&query)
            .bind(animal.name)
            .bind(animal.hours_trained)
            .bind(animal.owner_id)
            .bind(animal.date_of_birth)
            .bind(animal.profile_picture)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_animal(&self, id: RecordId) -> StoreResult<Option<Animal>> {
        let query = format!("SELECT {ANIMAL_COLUMNS} FROM animals WHERE id = $1");

        let row = sqlx::query_as::<_, Animal>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_animal_by_name(
        &self,
        owner_id: RecordId,
        name: &str,
    ) -> StoreResult<Option<Animal>> {
        let query = format!("SELECT {ANIMAL_COLUMNS} FROM animals WHERE owner_id = $1 AND name = $2");

        let row = sqlx::query_as::<_, Animal>(&query)
            .bind(owner_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_animals(&self, ids: &[RecordId]) -> StoreResult<Vec<Animal>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let query = format!("SELECT {ANIMAL_COLUMNS} FROM animals WHERE id = ANY($1)");

        let rows = sqlx::query_as::<_, Animal>(&query)
            .bind(raw_ids(ids))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn page_animals(
        &self,
        after: Option<RecordId>,
        limit: i64,
    ) -> StoreResult<Vec<Animal>> {
        let rows = sqlx::query_as::<_, Animal>(&page_query("animals", ANIMAL_COLUMNS))
            .bind(after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn set_animal_picture(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>> {
        let previous: Option<(Option<String>,)> =
            sqlx::query_as(&replace_key_query("animals", "profile_picture"))
                .bind(id)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(previous.map(|(key,)| key))
    }
}

#[async_trait]
impl TrainingLogStore for PgRepository {
    async fn insert_training_log(&self, log: NewTrainingLog) -> StoreResult<TrainingLog> {
        let query = format!(
            r#"
            INSERT INTO training_logs (date, description, hours, animal_id, user_id, training_log_video)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TRAINING_LOG_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, TrainingLog>(&query)
            .bind(log.date)
            .bind(log.description)
            .bind(log.hours)
            .bind(log.animal_id)
            .bind(log.user_id)
            .bind(log.training_log_video)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_training_log(&self, id: RecordId) -> StoreResult<Option<TrainingLog>> {
        let query = format!("SELECT {TRAINING_LOG_COLUMNS} FROM training_logs WHERE id = $1");

        let row = sqlx::query_as::<_, TrainingLog>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn page_training_logs(
        &self,
        after: Option<RecordId>,
        limit: i64,
    ) -> StoreResult<Vec<TrainingLog>> {
        let rows =
            sqlx::query_as::<_, TrainingLog>(&page_query("training_logs", TRAINING_LOG_COLUMNS))
                .bind(after)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }

    async fn set_training_log_video(
        &self,
        id: RecordId,
        key: &str,
    ) -> StoreResult<Option<Option<String>>> {
        let previous: Option<(Option<String>,)> =
            sqlx::query_as(&replace_key_query("training_logs", "training_log_video"))
                .bind(id)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(previous.map(|(key,)| key))
    }
}

#[async_trait]
impl StoreHealth for PgRepository {
    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_guards_unknown_cursor() {
        let query = page_query("animals", ANIMAL_COLUMNS);
        assert!(query.contains("id > $1"));
        assert!(query.contains("EXISTS (SELECT 1 FROM animals cursor_row"));
        assert!(query.contains("ORDER BY id ASC"));
        assert!(query.contains("LIMIT $2"));
    }

    #[test]
    fn test_replace_key_query_returns_previous() {
        let query = replace_key_query("training_logs", "training_log_video");
        assert!(query.contains("SET training_log_video = $2"));
        assert!(query.contains("RETURNING old.previous"));
    }
}
