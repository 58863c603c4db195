use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::snippets::{InsertSnippetEntity, SnippetEntity, UpdateSnippetEntity};
use crate::value_objects::snippets::ListSnippetsFilter;

#[async_trait]
#[automock]
pub trait SnippetRepository {
    async fn create(&self, insert_snippet_entity: InsertSnippetEntity) -> Result<SnippetEntity>;

    async fn update(
        &self,
        user_id: Uuid,
        snippet_id: Uuid,
        update_snippet_entity: UpdateSnippetEntity,
    ) -> Result<Option<SnippetEntity>>;

    /// Returns false when no row belonged to the user.
    async fn delete(&self, user_id: Uuid, snippet_id: Uuid) -> Result<bool>;

    async fn find(&self, user_id: Uuid, snippet_id: Uuid) -> Result<Option<SnippetEntity>>;

    async fn list(&self, user_id: Uuid, filter: ListSnippetsFilter) -> Result<Vec<SnippetEntity>>;
}
