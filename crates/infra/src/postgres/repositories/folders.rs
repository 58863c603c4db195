use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPool;
use domain::{
    entities::folders::{FolderEntity, InsertFolderEntity},
    repositories::folders::FolderRepository,
    schema::{folders, snippets},
};

pub struct FolderPostgres {
    db_pool: Arc<PgPool>,
}

impl FolderPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl FolderRepository for FolderPostgres {
    async fn create(&self, insert_folder_entity: InsertFolderEntity) -> Result<FolderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(folders::table)
            .values(&insert_folder_entity)
            .returning(FolderEntity::as_returning())
            .get_result::<FolderEntity>(&mut conn)?;

        Ok(row)
    }

    async fn rename(
        &self,
        user_id: Uuid,
        folder_id: Uuid,
        name: String,
    ) -> Result<Option<FolderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = diesel::update(
            folders::table
                .filter(folders::id.eq(folder_id))
                .filter(folders::user_id.eq(user_id)),
        )
        .set((
            folders::name.eq(name),
            folders::updated_at.eq(chrono::Utc::now()),
        ))
        .returning(FolderEntity::as_returning())
        .get_result::<FolderEntity>(&mut conn)
        .optional()?;

        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, folder_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::update(
                snippets::table
                    .filter(snippets::folder_id.eq(folder_id))
                    .filter(snippets::user_id.eq(user_id)),
            )
            .set(snippets::folder_id.eq(None::<Uuid>))
            .execute(conn)?;

            diesel::delete(
                folders::table
                    .filter(folders::id.eq(folder_id))
                    .filter(folders::user_id.eq(user_id)),
            )
            .execute(conn)
        })?;

        Ok(deleted > 0)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<FolderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = folders::table
            .filter(folders::user_id.eq(user_id))
            .select(FolderEntity::as_select())
            .order(folders::name.asc())
            .load::<FolderEntity>(&mut conn)?;

        Ok(rows)
    }
}
