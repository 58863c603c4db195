use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPool;
use domain::{
    entities::{
        shares::{InsertShareEntity, ShareEntity},
        snippets::SnippetEntity,
    },
    repositories::shares::ShareRepository,
    schema::{shares, snippets},
};

pub struct SharePostgres {
    db_pool: Arc<PgPool>,
}

impl SharePostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ShareRepository for SharePostgres {
    async fn publish(&self, insert_share_entity: InsertShareEntity) -> Result<ShareEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(shares::table)
            .values(&insert_share_entity)
            .returning(ShareEntity::as_returning())
            .get_result::<ShareEntity>(&mut conn)?;

        Ok(row)
    }

    async fn unpublish(&self, user_id: Uuid, snippet_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = diesel::delete(
            shares::table
                .filter(shares::snippet_id.eq(snippet_id))
                .filter(shares::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }

    async fn find_by_snippet(
        &self,
        user_id: Uuid,
        snippet_id: Uuid,
    ) -> Result<Option<ShareEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = shares::table
            .filter(shares::snippet_id.eq(snippet_id))
            .filter(shares::user_id.eq(user_id))
            .select(ShareEntity::as_select())
            .first::<ShareEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn resolve_slug(&self, slug: &str) -> Result<Option<(ShareEntity, SnippetEntity)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = shares::table
            .inner_join(snippets::table)
            .filter(shares::slug.eq(slug))
            .select((ShareEntity::as_select(), SnippetEntity::as_select()))
            .first::<(ShareEntity, SnippetEntity)>(&mut conn)
            .optional()?;

        Ok(row)
    }
}
