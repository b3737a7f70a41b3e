use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::result::AnalysisResult;
use crate::errors::AppError;
use crate::models::job::{JobFilter, JobRow, JobStatus, NewJob};

/// Job table access.
///
/// Writes follow a two-phase protocol: `insert_submitted` once, then exactly one
/// of `mark_done` / `mark_error`. Finalizing a job that already left `submitted`
/// is a `Conflict`.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert_submitted(&self, job: NewJob) -> Result<JobRow, AppError>;

    async fn mark_done(&self, id: Uuid, result: &AnalysisResult) -> Result<JobRow, AppError>;

    async fn mark_error(&self, id: Uuid, message: &str) -> Result<JobRow, AppError>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<JobRow>, AppError>;

    /// Newest first.
    async fn list(&self, user_id: Uuid, filter: &JobFilter) -> Result<Vec<JobRow>, AppError>;

    /// Hard delete. Returns `false` when no row matched.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

/// Error for a terminal update that matched no `submitted` row.
pub fn finalize_rejected(id: Uuid, current: Option<JobStatus>) -> AppError {
    match current {
        None => AppError::NotFound(format!("Job {id} not found")),
        Some(status) if status.is_terminal() => {
            AppError::Conflict(format!("Job {id} is already {}", status.as_str()))
        }
        Some(status) => AppError::Conflict(format!(
            "Job {id} cannot be finalized from status {}",
            status.as_str()
        )),
    }
}

#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_status(&self, id: Uuid) -> Result<Option<JobStatus>, AppError> {
        let status = sqlx::query_scalar::<_, JobStatus>("SELECT status FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(status)
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert_submitted(&self, job: NewJob) -> Result<JobRow, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (id, user_id, position, resume_text, status)
            VALUES ($1, $2, $3, $4, 'submitted')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.user_id)
        .bind(&job.position)
        .bind(&job.resume_text)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted job {} for user {}", row.id, row.user_id);
        Ok(row)
    }

    async fn mark_done(&self, id: Uuid, result: &AnalysisResult) -> Result<JobRow, AppError> {
        let result = serde_json::to_value(result)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize result: {e}")))?;

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = 'done', result = $2, updated_at = now()
            WHERE id = $1 AND status = 'submitted'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&result)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row),
            None => Err(finalize_rejected(id, self.current_status(id).await?)),
        }
    }

    async fn mark_error(&self, id: Uuid, message: &str) -> Result<JobRow, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = 'error', error_message = $2, updated_at = now()
            WHERE id = $1 AND status = 'submitted'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(message)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row),
            None => Err(finalize_rejected(id, self.current_status(id).await?)),
        }
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list(&self, user_id: Uuid, filter: &JobFilter) -> Result<Vec<JobRow>, AppError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            SELECT *
            FROM jobs
            WHERE user_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR position = $3)
              AND ($4::text IS NULL OR result->>'hire_recommendation' = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.position.as_deref())
        .bind(filter.recommendation.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let deleted = sqlx::query("DELETE FROM jobs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted > 0 {
            info!("Deleted job {id} for user {user_id}");
        }
        Ok(deleted > 0)
    }
}
