use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::folders;
use crate::value_objects::folders::FolderDto;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = folders)]
pub struct FolderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FolderEntity> for FolderDto {
    fn from(value: FolderEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = folders)]
pub struct InsertFolderEntity {
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
