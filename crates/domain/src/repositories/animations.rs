use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::animations::{AnimationEntity, InsertAnimationEntity, UpdateAnimationEntity};

#[async_trait]
#[automock]
pub trait AnimationRepository {
    async fn create(
        &self,
        insert_animation_entity: InsertAnimationEntity,
    ) -> Result<AnimationEntity>;

    async fn update(
        &self,
        user_id: Uuid,
        animation_id: Uuid,
        update_animation_entity: UpdateAnimationEntity,
    ) -> Result<Option<AnimationEntity>>;

    async fn delete(&self, user_id: Uuid, animation_id: Uuid) -> Result<bool>;

    async fn find(&self, user_id: Uuid, animation_id: Uuid) -> Result<Option<AnimationEntity>>;

    async fn list(&self, user_id: Uuid) -> Result<Vec<AnimationEntity>>;
}
