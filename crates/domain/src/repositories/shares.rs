use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::shares::{InsertShareEntity, ShareEntity};
use crate::entities::snippets::SnippetEntity;

#[async_trait]
#[automock]
pub trait ShareRepository {
    async fn publish(&self, insert_share_entity: InsertShareEntity) -> Result<ShareEntity>;

    /// Returns false when the snippet had no share owned by the user.
    async fn unpublish(&self, user_id: Uuid, snippet_id: Uuid) -> Result<bool>;

    async fn find_by_snippet(
        &self,
        user_id: Uuid,
        snippet_id: Uuid,
    ) -> Result<Option<ShareEntity>>;

    /// Public lookup: the share plus the snippet it points at.
    async fn resolve_slug(&self, slug: &str) -> Result<Option<(ShareEntity, SnippetEntity)>>;
}
