use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPool;
use domain::{
    entities::video_exports::{InsertVideoExportEntity, VideoExportEntity},
    repositories::video_exports::VideoExportRepository,
    schema::video_exports,
};

pub struct VideoExportPostgres {
    db_pool: Arc<PgPool>,
}

impl VideoExportPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl VideoExportRepository for VideoExportPostgres {
    async fn record(
        &self,
        insert_video_export_entity: InsertVideoExportEntity,
    ) -> Result<VideoExportEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(video_exports::table)
            .values(&insert_video_export_entity)
            .returning(VideoExportEntity::as_returning())
            .get_result::<VideoExportEntity>(&mut conn)?;

        Ok(row)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<VideoExportEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = video_exports::table
            .filter(video_exports::user_id.eq(user_id))
            .select(VideoExportEntity::as_select())
            .order(video_exports::created_at.desc())
            .load::<VideoExportEntity>(&mut conn)?;

        Ok(rows)
    }
}
