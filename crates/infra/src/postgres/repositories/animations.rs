use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPool;
use domain::{
    entities::animations::{
        AnimationEntity, AnimationRow, InsertAnimationEntity, UpdateAnimationEntity,
    },
    repositories::animations::AnimationRepository,
    schema::animations,
};

pub struct AnimationPostgres {
    db_pool: Arc<PgPool>,
}

impl AnimationPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AnimationRepository for AnimationPostgres {
    async fn create(
        &self,
        insert_animation_entity: InsertAnimationEntity,
    ) -> Result<AnimationEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(animations::table)
            .values(&insert_animation_entity)
            .returning(AnimationRow::as_returning())
            .get_result::<AnimationRow>(&mut conn)?;

        Ok(row.into())
    }

    async fn update(
        &self,
        user_id: Uuid,
        animation_id: Uuid,
        update_animation_entity: UpdateAnimationEntity,
    ) -> Result<Option<AnimationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = diesel::update(
            animations::table
                .filter(animations::id.eq(animation_id))
                .filter(animations::user_id.eq(user_id)),
        )
        .set(&update_animation_entity)
        .returning(AnimationRow::as_returning())
        .get_result::<AnimationRow>(&mut conn)
        .optional()?;

        Ok(row.map(AnimationEntity::from))
    }

    async fn delete(&self, user_id: Uuid, animation_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = diesel::delete(
            animations::table
                .filter(animations::id.eq(animation_id))
                .filter(animations::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }

    async fn find(&self, user_id: Uuid, animation_id: Uuid) -> Result<Option<AnimationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = animations::table
            .filter(animations::id.eq(animation_id))
            .filter(animations::user_id.eq(user_id))
            .select(AnimationRow::as_select())
            .first::<AnimationRow>(&mut conn)
            .optional()?;

        Ok(row.map(AnimationEntity::from))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<AnimationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = animations::table
            .filter(animations::user_id.eq(user_id))
            .select(AnimationRow::as_select())
            .order(animations::updated_at.desc())
            .load::<AnimationRow>(&mut conn)?;

        Ok(rows.into_iter().map(AnimationEntity::from).collect())
    }
}
