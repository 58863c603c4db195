use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFolderModel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameFolderModel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderDto {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
