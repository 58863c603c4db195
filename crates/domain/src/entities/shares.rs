use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::shares;
use crate::value_objects::shares::ShareDto;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = shares)]
pub struct ShareEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub snippet_id: Uuid,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl From<ShareEntity> for ShareDto {
    fn from(value: ShareEntity) -> Self {
        Self {
            id: value.id,
            snippet_id: value.snippet_id,
            slug: value.slug,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = shares)]
pub struct InsertShareEntity {
    pub user_id: Uuid,
    pub snippet_id: Uuid,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}
