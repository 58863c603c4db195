use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::video_exports::{InsertVideoExportEntity, VideoExportEntity};

#[async_trait]
#[automock]
pub trait VideoExportRepository {
    async fn record(
        &self,
        insert_video_export_entity: InsertVideoExportEntity,
    ) -> Result<VideoExportEntity>;

    async fn list(&self, user_id: Uuid) -> Result<Vec<VideoExportEntity>>;
}
