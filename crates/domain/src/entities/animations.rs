use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::animations;
use crate::value_objects::animations::{AnimationDto, AnimationSlide};

#[derive(Debug, Clone)]
pub struct AnimationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slides: Vec<AnimationSlide>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw row used for Diesel queries. Slides stay as JSON and are parsed into
/// `AnimationSlide` values.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = animations)]
pub struct AnimationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slides: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AnimationRow> for AnimationEntity {
    fn from(value: AnimationRow) -> Self {
        let slides = serde_json::from_value(value.slides).unwrap_or_default();

        Self {
            id: value.id,
            user_id: value.user_id,
            title: value.title,
            slides,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<AnimationEntity> for AnimationDto {
    fn from(value: AnimationEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            slides: value.slides,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = animations)]
pub struct InsertAnimationEntity {
    pub user_id: Uuid,
    pub title: String,
    pub slides: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = animations)]
pub struct UpdateAnimationEntity {
    pub title: Option<String>,
    pub slides: Option<serde_json::Value>,
    pub updated_at: Option<DateTime<Utc>>,
}
