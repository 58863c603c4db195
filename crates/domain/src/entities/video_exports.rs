use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::video_exports;
use crate::value_objects::video_exports::VideoExportDto;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = video_exports)]
pub struct VideoExportEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub animation_id: Uuid,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

impl From<VideoExportEntity> for VideoExportDto {
    fn from(value: VideoExportEntity) -> Self {
        Self {
            id: value.id,
            animation_id: value.animation_id,
            format: value.format,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = video_exports)]
pub struct InsertVideoExportEntity {
    pub user_id: Uuid,
    pub animation_id: Uuid,
    pub format: String,
    pub created_at: DateTime<Utc>,
}
