use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::folders::{FolderEntity, InsertFolderEntity};

#[async_trait]
#[automock]
pub trait FolderRepository {
    async fn create(&self, insert_folder_entity: InsertFolderEntity) -> Result<FolderEntity>;

    async fn rename(
        &self,
        user_id: Uuid,
        folder_id: Uuid,
        name: String,
    ) -> Result<Option<FolderEntity>>;

    /// Detaches contained snippets, then removes the folder. Returns false
    /// when no row belonged to the user.
    async fn delete(&self, user_id: Uuid, folder_id: Uuid) -> Result<bool>;

    async fn list(&self, user_id: Uuid) -> Result<Vec<FolderEntity>>;
}
