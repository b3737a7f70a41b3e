use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A saved position definition, reused across job submissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub requirements: String,
    pub created_at: DateTime<Utc>,
}

/// Editable fields of a profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub requirements: String,
}
