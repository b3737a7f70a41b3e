//! Axum route handlers for the Jobs API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::pipeline::Submission;
use crate::analysis::prompt_builder::{parse_data_url, CandidateContent, DEFAULT_DOCUMENT_MIME};
use crate::analysis::result::Recommendation;
use crate::errors::AppError;
use crate::feed::{ChangeEvent, ChangeKind, Table};
use crate::models::job::{JobFilter, JobRow, JobStatus};
use crate::routes::{non_blank, UserIdQuery};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

fn default_include_contact() -> bool {
    true
}

/// Body of `POST /api/v1/jobs`.
///
/// The position comes from `profile_id` or from `position` + `job_requirements`.
/// The resume comes from exactly one of `resume_text` or `file_data` (a data URL).
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub position: Option<String>,
    pub job_requirements: Option<String>,
    pub resume_text: Option<String>,
    pub file_data: Option<String>,
    #[serde(default = "default_include_contact")]
    pub include_contact: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub user_id: Uuid,
    pub status: Option<JobStatus>,
    pub position: Option<String>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub jobs: Vec<JobRow>,
    pub done: usize,
    pub failed: usize,
}

/// Position label and requirement text the resume is evaluated against.
struct Target {
    position: String,
    requirements: String,
}

async fn resolve_target(
    state: &AppState,
    user_id: Uuid,
    profile_id: Option<Uuid>,
    position: Option<String>,
    requirements: Option<String>,
) -> Result<Target, AppError> {
    if let Some(profile_id) = profile_id {
        let profile = state
            .profiles
            .get(user_id, profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;
        return Ok(Target {
            position: profile.name,
            requirements: profile.requirements,
        });
    }

    Ok(Target {
        position: non_blank(position, "position")?,
        requirements: non_blank(requirements, "job_requirements")?,
    })
}

fn candidate_content(
    resume_text: Option<String>,
    file_data: Option<String>,
) -> Result<CandidateContent, AppError> {
    let resume_text = resume_text.filter(|t| !t.trim().is_empty());
    let file_data = file_data.filter(|f| !f.trim().is_empty());
    match (resume_text, file_data) {
        (Some(_), Some(_)) => Err(AppError::Validation(
            "provide either resume_text or file_data, not both".to_string(),
        )),
        (Some(text), None) => Ok(CandidateContent::Text(text)),
        (None, Some(data_url)) => Ok(CandidateContent::Document(parse_data_url(&data_url)?)),
        (None, None) => Err(AppError::Validation(
            "resume_text or file_data is required".to_string(),
        )),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs
///
/// Analyzes one resume and returns the job in its terminal state. A failed
/// analysis is still `201`: the job row carries `status = "error"`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let content = candidate_content(req.resume_text, req.file_data)?;
    let target = resolve_target(
        &state,
        req.user_id,
        req.profile_id,
        req.position,
        req.job_requirements,
    )
    .await?;

    let job = state
        .analyzer
        .analyze(Submission {
            user_id: req.user_id,
            position: target.position,
            requirements: target.requirements,
            content,
            include_contact: req.include_contact,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// POST /api/v1/jobs/batch
///
/// Multipart form: `user_id`, either `profile_id` or `position` + `job_requirements`,
/// optional `include_contact`, and one or more file parts. Files are analyzed
/// sequentially in upload order.
pub async fn handle_analyze_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut profile_id: Option<Uuid> = None;
    let mut position: Option<String> = None;
    let mut requirements: Option<String> = None;
    let mut include_contact = true;
    let mut files: Vec<CandidateContent> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let mime_type = field
                .content_type()
                .unwrap_or(DEFAULT_DOCUMENT_MIME)
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read {file_name}: {e}")))?;
            if bytes.is_empty() {
                return Err(AppError::Validation(format!("File {file_name} is empty")));
            }
            files.push(file_content(&file_name, &mime_type, &bytes)?);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field {name}: {e}")))?;
        match name.as_str() {
            "user_id" => user_id = Some(parse_uuid(&value, "user_id")?),
            "profile_id" => profile_id = Some(parse_uuid(&value, "profile_id")?),
            "position" => position = Some(value),
            "job_requirements" => requirements = Some(value),
            "include_contact" => include_contact = value.trim() != "false",
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    if files.is_empty() {
        return Err(AppError::Validation("at least one file is required".to_string()));
    }
    let target = resolve_target(&state, user_id, profile_id, position, requirements).await?;

    info!("Batch of {} files for user {user_id}", files.len());
    let submissions = files
        .into_iter()
        .map(|content| Submission {
            user_id,
            position: target.position.clone(),
            requirements: target.requirements.clone(),
            content,
            include_contact,
        })
        .collect();

    let jobs = state.analyzer.analyze_batch(submissions).await?;
    let done = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Done)
        .count();
    let failed = jobs.len() - done;

    Ok((StatusCode::CREATED, Json(BatchResponse { jobs, done, failed })))
}

fn file_content(
    file_name: &str,
    mime_type: &str,
    bytes: &[u8],
) -> Result<CandidateContent, AppError> {
    if mime_type.starts_with("text/") {
        let text = std::str::from_utf8(bytes).map_err(|_| {
            AppError::Validation(format!("File {file_name} is not valid UTF-8 text"))
        })?;
        Ok(CandidateContent::Text(text.to_string()))
    } else {
        Ok(CandidateContent::from_bytes(bytes, mime_type))
    }
}

fn parse_uuid(value: &str, field: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("{field} must be a valid UUID")))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let filter = JobFilter {
        status: query.status,
        position: query.position.filter(|p| !p.trim().is_empty()),
        recommendation: query.recommendation,
    };
    Ok(Json(state.jobs.list(query.user_id, &filter).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<JobRow>, AppError> {
    state
        .jobs
        .get(params.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// DELETE /api/v1/jobs/:id
///
/// Hard delete; the row is not recoverable.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if !state.jobs.delete(params.user_id, id).await? {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    state.feed.publish(ChangeEvent {
        table: Table::Jobs,
        kind: ChangeKind::Delete,
        id,
        user_id: params.user_id,
    });
    Ok(StatusCode::NO_CONTENT)
}
