use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPool;
use domain::{
    entities::snippets::{InsertSnippetEntity, SnippetEntity, UpdateSnippetEntity},
    repositories::snippets::SnippetRepository,
    schema::snippets,
    value_objects::snippets::ListSnippetsFilter,
};

pub struct SnippetPostgres {
    db_pool: Arc<PgPool>,
}

impl SnippetPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SnippetRepository for SnippetPostgres {
    async fn create(&self, insert_snippet_entity: InsertSnippetEntity) -> Result<SnippetEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(snippets::table)
            .values(&insert_snippet_entity)
            .returning(SnippetEntity::as_returning())
            .get_result::<SnippetEntity>(&mut conn)?;

        Ok(row)
    }

    async fn update(
        &self,
        user_id: Uuid,
        snippet_id: Uuid,
        update_snippet_entity: UpdateSnippetEntity,
    ) -> Result<Option<SnippetEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = diesel::update(
            snippets::table
                .filter(snippets::id.eq(snippet_id))
                .filter(snippets::user_id.eq(user_id)),
        )
        .set(&update_snippet_entity)
        .returning(SnippetEntity::as_returning())
        .get_result::<SnippetEntity>(&mut conn)
        .optional()?;

        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, snippet_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = diesel::delete(
            snippets::table
                .filter(snippets::id.eq(snippet_id))
                .filter(snippets::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }

    async fn find(&self, user_id: Uuid, snippet_id: Uuid) -> Result<Option<SnippetEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = snippets::table
            .filter(snippets::id.eq(snippet_id))
            .filter(snippets::user_id.eq(user_id))
            .select(SnippetEntity::as_select())
            .first::<SnippetEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn list(&self, user_id: Uuid, filter: ListSnippetsFilter) -> Result<Vec<SnippetEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = snippets::table
            .filter(snippets::user_id.eq(user_id))
            .select(SnippetEntity::as_select())
            .into_boxed();

        if let Some(folder_id) = filter.folder_id {
            query = query.filter(snippets::folder_id.eq(folder_id));
        }

        let rows = query
            .order(snippets::updated_at.desc())
            .load::<SnippetEntity>(&mut conn)?;

        Ok(rows)
    }
}
