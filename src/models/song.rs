use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Song {
    pub id: Uuid,
    pub name: String,
    pub invitation_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSong {
    pub name: String,
    pub invitation_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSongRequest {
    pub name: String,
}
