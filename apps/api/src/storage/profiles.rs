use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{ProfileInput, ProfileRow};

/// Profile table access. Every operation is scoped to the owning user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<ProfileRow>, AppError>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<ProfileRow>, AppError>;

    async fn create(&self, user_id: Uuid, input: &ProfileInput) -> Result<ProfileRow, AppError>;

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &ProfileInput,
    ) -> Result<Option<ProfileRow>, AppError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<ProfileRow>, AppError> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM job_profiles WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM job_profiles WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create(&self, user_id: Uuid, input: &ProfileInput) -> Result<ProfileRow, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO job_profiles (id, user_id, name, requirements)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.requirements)
        .fetch_one(&self.pool)
        .await?;

        info!("Created profile {} for user {user_id}", row.id);
        Ok(row)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &ProfileInput,
    ) -> Result<Option<ProfileRow>, AppError> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE job_profiles
            SET name = $3, requirements = $4
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.requirements)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let deleted = sqlx::query("DELETE FROM job_profiles WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
