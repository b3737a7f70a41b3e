//! In-memory stand-ins for the stores and the inference backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::analysis::pipeline::Analyzer;
use crate::analysis::result::AnalysisResult;
use crate::errors::AppError;
use crate::feed::ChangeFeed;
use crate::llm_client::{InferenceBackend, LlmError, LlmRequest};
use crate::models::job::{JobFilter, JobRow, JobStatus, NewJob};
use crate::models::profile::{ProfileInput, ProfileRow};
use crate::state::AppState;
use crate::storage::jobs::finalize_rejected;
use crate::storage::{JobStore, ProfileStore};

#[derive(Default)]
pub struct InMemoryJobStore {
    rows: Mutex<Vec<JobRow>>,
}

impl InMemoryJobStore {
    fn finalize(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut JobRow),
    ) -> Result<JobRow, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|r| r.id == id);
        match row {
            Some(row) if row.status == JobStatus::Submitted => {
                apply(row);
                row.updated_at = Utc::now();
                Ok(row.clone())
            }
            Some(row) => Err(finalize_rejected(id, Some(row.status))),
            None => Err(finalize_rejected(id, None)),
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert_submitted(&self, job: NewJob) -> Result<JobRow, AppError> {
        let now = Utc::now();
        let row = JobRow {
            id: Uuid::new_v4(),
            user_id: job.user_id,
            position: job.position,
            resume_text: job.resume_text,
            status: JobStatus::Submitted,
            result: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn mark_done(&self, id: Uuid, result: &AnalysisResult) -> Result<JobRow, AppError> {
        let value = serde_json::to_value(result).unwrap();
        // PostgreSQL jsonb rejects NUL characters.
        if value.to_string().contains("\\u0000") {
            return Err(AppError::Database(sqlx::Error::Protocol(
                "unsupported Unicode escape sequence".to_string(),
            )));
        }
        self.finalize(id, |row| {
            row.status = JobStatus::Done;
            row.result = Some(value);
        })
    }

    async fn mark_error(&self, id: Uuid, message: &str) -> Result<JobRow, AppError> {
        self.finalize(id, |row| {
            row.status = JobStatus::Error;
            row.error_message = Some(message.to_string());
        })
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn list(&self, user_id: Uuid, filter: &JobFilter) -> Result<Vec<JobRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id && filter.matches(r))
            .cloned()
            .collect())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: Mutex<Vec<ProfileRow>>,
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<ProfileRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn create(&self, user_id: Uuid, input: &ProfileInput) -> Result<ProfileRow, AppError> {
        let row = ProfileRow {
            id: Uuid::new_v4(),
            user_id,
            name: input.name.clone(),
            requirements: input.requirements.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &ProfileInput,
    ) -> Result<Option<ProfileRow>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
            .map(|row| {
                row.name = input.name.clone();
                row.requirements = input.requirements.clone();
                row.clone()
            }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(rows.len() < before)
    }
}

/// Returns queued replies in order and records every request it receives.
pub struct ScriptedInference {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedInference {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedInference {
    async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Application state wired entirely to in-memory fakes.
pub fn test_state(replies: Vec<Result<String, LlmError>>) -> (AppState, Arc<ScriptedInference>) {
    let jobs = Arc::new(InMemoryJobStore::default());
    let profiles = Arc::new(InMemoryProfileStore::default());
    let inference = Arc::new(ScriptedInference::new(replies));
    let feed = ChangeFeed::default();
    let analyzer = Analyzer::new(inference.clone(), jobs.clone(), feed.clone());
    let state = AppState {
        jobs,
        profiles,
        analyzer,
        feed,
    };
    (state, inference)
}
