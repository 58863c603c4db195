use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPool;
use domain::{
    repositories::usage_counts::UsageCountsRepository,
    schema::{animations, folders, shares, snippets, video_exports},
    value_objects::usage::ResourceCounts,
};

pub struct UsageCountsPostgres {
    db_pool: Arc<PgPool>,
}

impl UsageCountsPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UsageCountsRepository for UsageCountsPostgres {
    /// The batched backing-store call: five counts on one pooled connection.
    async fn fetch_counts(&self, user_id: Uuid) -> Result<ResourceCounts> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let snippets = snippets::table
            .filter(snippets::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;
        let animations = animations::table
            .filter(animations::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;
        let folders = folders::table
            .filter(folders::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;
        let video_exports = video_exports::table
            .filter(video_exports::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;
        let public_shares = shares::table
            .filter(shares::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(ResourceCounts {
            snippets,
            animations,
            folders,
            video_exports,
            public_shares,
        })
    }
}
