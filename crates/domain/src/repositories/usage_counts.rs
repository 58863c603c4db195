use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::value_objects::usage::ResourceCounts;

/// Backing-store contract for the usage engine: all counted resources for
/// one user in a single batched call.
#[async_trait]
#[automock]
pub trait UsageCountsRepository {
    async fn fetch_counts(&self, user_id: Uuid) -> Result<ResourceCounts>;
}
