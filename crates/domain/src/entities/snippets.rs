use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::snippets;
use crate::value_objects::snippets::SnippetDto;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = snippets)]
pub struct SnippetEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub language: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SnippetEntity> for SnippetDto {
    fn from(value: SnippetEntity) -> Self {
        Self {
            id: value.id,
            folder_id: value.folder_id,
            title: value.title,
            language: value.language,
            code: value.code,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = snippets)]
pub struct InsertSnippetEntity {
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub language: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = snippets)]
pub struct UpdateSnippetEntity {
    pub folder_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
