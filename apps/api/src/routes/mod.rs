pub mod events;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::handlers as jobs;
use crate::errors::AppError;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

/// Upper bound for request bodies; uploads arrive base64-encoded or as multipart.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Owner scope for reads and deletes. The caller's identity is resolved upstream.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Rejects a missing or whitespace-only field.
pub fn non_blank(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} cannot be empty")))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route(
            "/api/v1/profiles",
            get(profiles::handle_list_profiles).post(profiles::handle_create_profile),
        )
        .route(
            "/api/v1/profiles/:id",
            put(profiles::handle_update_profile).delete(profiles::handle_delete_profile),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_analyze),
        )
        .route("/api/v1/jobs/batch", post(jobs::handle_analyze_batch))
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job).delete(jobs::handle_delete_job),
        )
        // Change feed
        .route("/api/v1/events", get(events::handle_events))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
