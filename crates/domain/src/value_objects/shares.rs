use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct PublishShareModel {
    pub snippet_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareDto {
    pub id: Uuid,
    pub snippet_id: Uuid,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Snippet payload served on the public share page; no owner identifiers.
#[derive(Debug, Clone, Serialize)]
pub struct SharedSnippetDto {
    pub slug: String,
    pub title: String,
    pub language: String,
    pub code: String,
}
