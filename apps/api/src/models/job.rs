use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::result::Recommendation;

/// Lifecycle of a job: `submitted → done` or `submitted → error`.
/// Both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum JobStatus {
    Submitted,
    Done,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Submitted => "submitted",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Submitted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Profile name copied at submission time.
    pub position: String,
    pub resume_text: String,
    pub status: JobStatus,
    /// Present only when `status = done`.
    pub result: Option<Value>,
    /// Present only when `status = error`.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by the first phase of a job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub user_id: Uuid,
    pub position: String,
    pub resume_text: String,
}

/// Optional listing filters. `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub position: Option<String>,
    pub recommendation: Option<Recommendation>,
}

impl JobFilter {
    /// In-memory counterpart of the WHERE clause in `PgJobStore::list`.
    #[cfg(test)]
    pub fn matches(&self, job: &JobRow) -> bool {
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        if let Some(position) = &self.position {
            if &job.position != position {
                return false;
            }
        }
        if let Some(recommendation) = self.recommendation {
            let verdict = job
                .result
                .as_ref()
                .and_then(|r| r.get("hire_recommendation"))
                .and_then(|v| v.as_str());
            if verdict != Some(recommendation.as_str()) {
                return false;
            }
        }
        true
    }
}
