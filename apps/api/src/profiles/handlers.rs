use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feed::{ChangeEvent, ChangeKind, Table};
use crate::models::profile::{ProfileInput, ProfileRow};
use crate::routes::{non_blank, UserIdQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub requirements: Option<String>,
}

impl ProfileRequest {
    fn into_input(self) -> Result<(Uuid, ProfileInput), AppError> {
        Ok((
            self.user_id,
            ProfileInput {
                name: non_blank(self.name, "name")?,
                requirements: non_blank(self.requirements, "requirements")?,
            },
        ))
    }
}

/// GET /api/v1/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ProfileRow>>, AppError> {
    Ok(Json(state.profiles.list(params.user_id).await?))
}

/// POST /api/v1/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<ProfileRow>), AppError> {
    let (user_id, input) = req.into_input()?;
    let profile = state.profiles.create(user_id, &input).await?;
    state
        .feed
        .publish(ChangeEvent::profile(ChangeKind::Insert, &profile));
    Ok((StatusCode::CREATED, Json(profile)))
}

/// PUT /api/v1/profiles/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileRow>, AppError> {
    let (user_id, input) = req.into_input()?;
    let profile = state
        .profiles
        .update(user_id, id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))?;
    state
        .feed
        .publish(ChangeEvent::profile(ChangeKind::Update, &profile));
    Ok(Json(profile))
}

/// DELETE /api/v1/profiles/:id
///
/// Jobs keep their copied position label; nothing cascades.
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if !state.profiles.delete(params.user_id, id).await? {
        return Err(AppError::NotFound(format!("Profile {id} not found")));
    }
    state.feed.publish(ChangeEvent {
        table: Table::JobProfiles,
        kind: ChangeKind::Delete,
        id,
        user_id: params.user_id,
    });
    Ok(StatusCode::NO_CONTENT)
}
