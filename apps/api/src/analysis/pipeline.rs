//! Analysis pipeline: one submitted resume in, one terminal job out.
//!
//! Flow: insert `submitted` job → build prompt → single inference call →
//!       extract + validate → `mark_done` | `mark_error`.
//!
//! The caller awaits the whole flow and receives the job in its terminal state.
//! Inference and extraction failures are recorded on the job; only storage
//! failures surface as `Err`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::extractor::{parse_analysis, ExtractionError};
use crate::analysis::prompt_builder::{build_prompt, CandidateContent};
use crate::analysis::result::AnalysisResult;
use crate::errors::AppError;
use crate::feed::{ChangeEvent, ChangeFeed, ChangeKind};
use crate::llm_client::{InferenceBackend, LlmError};
use crate::models::job::{JobRow, NewJob};
use crate::storage::JobStore;

/// Characters of pasted resume text kept in the job row.
pub const MAX_STORED_SOURCE_CHARS: usize = 5000;

/// Stored in place of the source text for document submissions.
pub const DOCUMENT_PLACEHOLDER: &str = "[PDF/Document File Analysis]";

/// Characters of a malformed reply quoted in the job's error message.
const REPLY_EXCERPT_CHARS: usize = 200;

/// One candidate to evaluate against one position.
#[derive(Debug, Clone)]
pub struct Submission {
    pub user_id: Uuid,
    pub position: String,
    pub requirements: String,
    pub content: CandidateContent,
    pub include_contact: bool,
}

impl Submission {
    fn stored_source_text(&self) -> String {
        match &self.content {
            CandidateContent::Text(text) => text.chars().take(MAX_STORED_SOURCE_CHARS).collect(),
            CandidateContent::Document(_) => DOCUMENT_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Error)]
enum AnalysisFailure {
    #[error("inference failed: {0}")]
    Inference(#[from] LlmError),

    #[error("malformed model response: {error} (reply: {excerpt:?})")]
    Malformed {
        error: ExtractionError,
        excerpt: String,
    },
}

#[derive(Clone)]
pub struct Analyzer {
    inference: Arc<dyn InferenceBackend>,
    jobs: Arc<dyn JobStore>,
    feed: ChangeFeed,
}

impl Analyzer {
    pub fn new(
        inference: Arc<dyn InferenceBackend>,
        jobs: Arc<dyn JobStore>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            inference,
            jobs,
            feed,
        }
    }

    pub fn model_name(&self) -> &str {
        self.inference.model_name()
    }

    /// Runs one submission to a terminal job.
    pub async fn analyze(&self, submission: Submission) -> Result<JobRow, AppError> {
        let job = self
            .jobs
            .insert_submitted(NewJob {
                user_id: submission.user_id,
                position: submission.position.clone(),
                resume_text: submission.stored_source_text(),
            })
            .await?;
        self.feed.publish(ChangeEvent::job(ChangeKind::Insert, &job));

        info!(
            "Analyzing job {} for user {} (position: {}, document: {})",
            job.id,
            job.user_id,
            submission.position,
            submission.content.is_document()
        );

        let finished = match self.evaluate(&submission).await {
            Ok(result) => {
                info!(
                    "Job {} done: hire_recommendation={}",
                    job.id,
                    result.hire_recommendation.as_str()
                );
                match self.jobs.mark_done(job.id, &result).await {
                    Ok(row) => row,
                    // The row must still reach a terminal state when the result is unstorable.
                    Err(AppError::Database(e)) => {
                        warn!("Job {} result could not be stored: {e}", job.id);
                        let message = format!("failed to store analysis result: {e}");
                        self.jobs.mark_error(job.id, &message).await?
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(failure) => {
                warn!("Job {} failed: {failure}", job.id);
                self.jobs.mark_error(job.id, &failure.to_string()).await?
            }
        };
        self.feed.publish(ChangeEvent::job(ChangeKind::Update, &finished));

        Ok(finished)
    }

    /// Runs submissions one at a time, in order. A failed analysis does not stop
    /// the batch; a storage failure does.
    pub async fn analyze_batch(
        &self,
        submissions: Vec<Submission>,
    ) -> Result<Vec<JobRow>, AppError> {
        let total = submissions.len();
        let mut jobs = Vec::with_capacity(total);
        for (index, submission) in submissions.into_iter().enumerate() {
            info!("Batch item {}/{}", index + 1, total);
            jobs.push(self.analyze(submission).await?);
        }
        Ok(jobs)
    }

    async fn evaluate(&self, submission: &Submission) -> Result<AnalysisResult, AnalysisFailure> {
        let request = build_prompt(
            &submission.position,
            &submission.requirements,
            &submission.content,
            submission.include_contact,
        );
        let reply = self.inference.generate(&request).await?;
        parse_analysis(&reply).map_err(|error| AnalysisFailure::Malformed {
            error,
            excerpt: reply
                .chars()
                .filter(|c| *c != '\0')
                .take(REPLY_EXCERPT_CHARS)
                .collect(),
        })
    }
}
