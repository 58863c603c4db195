use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSnippetModel {
    pub title: String,
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSnippetModel {
    pub title: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub folder_id: Option<Uuid>,
    /// Moves the snippet out of its folder; mutually exclusive with `folder_id`.
    #[serde(default)]
    pub clear_folder: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnippetDto {
    pub id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub language: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSnippetsFilter {
    pub folder_id: Option<Uuid>,
}
