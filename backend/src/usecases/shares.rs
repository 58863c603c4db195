use std::sync::Arc;

use chrono::Utc;
use domain::{
    entities::shares::InsertShareEntity,
    repositories::{
        app_users::AppUserRepository, shares::ShareRepository, snippets::SnippetRepository,
        subscriptions::SubscriptionRepository, usage_counts::UsageCountsRepository,
    },
    value_objects::{
        plans::ResourceKind,
        shares::{PublishShareModel, ShareDto, SharedSnippetDto},
    },
};
use rand::{Rng, distributions::Alphanumeric};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::{
    admission::{AdmissionError, ensure_capacity},
    usage::UsageUseCase,
};

const SLUG_LENGTH: usize = 10;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("snippet not found")]
    SnippetNotFound,
    #[error("share not found")]
    ShareNotFound,
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ShareError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ShareError::SnippetNotFound | ShareError::ShareNotFound => StatusCode::NOT_FOUND,
            ShareError::Admission(err) => err.status_code(),
            ShareError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct ShareUseCase<R, Sn, C, A, S>
where
    R: ShareRepository + Send + Sync + 'static,
    Sn: SnippetRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    share_repo: Arc<R>,
    snippet_repo: Arc<Sn>,
    usage_usecase: Arc<UsageUseCase<C, A, S>>,
}

impl<R, Sn, C, A, S> ShareUseCase<R, Sn, C, A, S>
where
    R: ShareRepository + Send + Sync + 'static,
    Sn: SnippetRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(
        share_repo: Arc<R>,
        snippet_repo: Arc<Sn>,
        usage_usecase: Arc<UsageUseCase<C, A, S>>,
    ) -> Self {
        Self {
            share_repo,
            snippet_repo,
            usage_usecase,
        }
    }

    pub async fn publish_snippet(
        &self,
        user_id: Uuid,
        model: PublishShareModel,
    ) -> Result<ShareDto, ShareError> {
        info!(%user_id, snippet_id = %model.snippet_id, "shares: publish requested");

        self.snippet_repo
            .find(user_id, model.snippet_id)
            .await
            .map_err(ShareError::Internal)?
            .ok_or(ShareError::SnippetNotFound)?;

        // Republishing returns the existing link instead of minting a new
        // slug, so existing embeds keep working.
        if let Some(existing) = self
            .share_repo
            .find_by_snippet(user_id, model.snippet_id)
            .await
            .map_err(ShareError::Internal)?
        {
            info!(%user_id, slug = %existing.slug, "shares: already published");
            return Ok(existing.into());
        }

        let usage = self
            .usage_usecase
            .get_user_usage(user_id)
            .await
            .map_err(AdmissionError::from)?;
        ensure_capacity(&usage, ResourceKind::PublicShares).map_err(|err| {
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "shares: publish denied by plan ceiling"
            );
            err
        })?;

        let slug: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SLUG_LENGTH)
            .map(char::from)
            .collect();

        let published = self
            .share_repo
            .publish(InsertShareEntity {
                user_id,
                snippet_id: model.snippet_id,
                slug,
                created_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "shares: publish failed");
                ShareError::Internal(err)
            })?;

        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, slug = %published.slug, "shares: published");
        Ok(published.into())
    }

    pub async fn unpublish_snippet(
        &self,
        user_id: Uuid,
        snippet_id: Uuid,
    ) -> Result<(), ShareError> {
        let removed = self
            .share_repo
            .unpublish(user_id, snippet_id)
            .await
            .map_err(|err| {
                error!(%user_id, %snippet_id, db_error = ?err, "shares: unpublish failed");
                ShareError::Internal(err)
            })?;

        if !removed {
            return Err(ShareError::ShareNotFound);
        }

        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, %snippet_id, "shares: unpublished");
        Ok(())
    }

    /// Public resolution for the share page and embeds; no auth involved.
    pub async fn resolve_share(&self, slug: &str) -> Result<SharedSnippetDto, ShareError> {
        let (share, snippet) = self
            .share_repo
            .resolve_slug(slug)
            .await
            .map_err(ShareError::Internal)?
            .ok_or(ShareError::ShareNotFound)?;

        Ok(SharedSnippetDto {
            slug: share.slug,
            title: snippet.title,
            language: snippet.language,
            code: snippet.code,
        })
    }
}
