use std::sync::Arc;

use chrono::Utc;
use domain::{
    entities::video_exports::InsertVideoExportEntity,
    repositories::{
        animations::AnimationRepository, app_users::AppUserRepository,
        subscriptions::SubscriptionRepository, usage_counts::UsageCountsRepository,
        video_exports::VideoExportRepository,
    },
    value_objects::{
        plans::ResourceKind,
        video_exports::{RecordExportModel, VideoExportDto},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::{
    admission::{AdmissionError, ensure_capacity},
    usage::UsageUseCase,
};

#[derive(Debug, Error)]
pub enum VideoExportError {
    #[error("animation not found")]
    AnimationNotFound,
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl VideoExportError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            VideoExportError::AnimationNotFound => StatusCode::NOT_FOUND,
            VideoExportError::Admission(err) => err.status_code(),
            VideoExportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Records completed exports against the plan ceiling. Rendering itself
/// happens client-side; the backend only admits and counts.
pub struct VideoExportUseCase<R, An, C, A, S>
where
    R: VideoExportRepository + Send + Sync + 'static,
    An: AnimationRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    video_export_repo: Arc<R>,
    animation_repo: Arc<An>,
    usage_usecase: Arc<UsageUseCase<C, A, S>>,
}

impl<R, An, C, A, S> VideoExportUseCase<R, An, C, A, S>
where
    R: VideoExportRepository + Send + Sync + 'static,
    An: AnimationRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(
        video_export_repo: Arc<R>,
        animation_repo: Arc<An>,
        usage_usecase: Arc<UsageUseCase<C, A, S>>,
    ) -> Self {
        Self {
            video_export_repo,
            animation_repo,
            usage_usecase,
        }
    }

    pub async fn record_export(
        &self,
        user_id: Uuid,
        model: RecordExportModel,
    ) -> Result<VideoExportDto, VideoExportError> {
        info!(
            %user_id,
            animation_id = %model.animation_id,
            format = %model.format,
            "video_exports: record requested"
        );

        let usage = self
            .usage_usecase
            .get_user_usage(user_id)
            .await
            .map_err(AdmissionError::from)?;
        ensure_capacity(&usage, ResourceKind::VideoExports).map_err(|err| {
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "video_exports: record denied by plan ceiling"
            );
            err
        })?;

        self.animation_repo
            .find(user_id, model.animation_id)
            .await
            .map_err(VideoExportError::Internal)?
            .ok_or(VideoExportError::AnimationNotFound)?;

        let recorded = self
            .video_export_repo
            .record(InsertVideoExportEntity {
                user_id,
                animation_id: model.animation_id,
                format: model.format,
                created_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "video_exports: record failed");
                VideoExportError::Internal(err)
            })?;

        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, export_id = %recorded.id, "video_exports: recorded");
        Ok(recorded.into())
    }

    pub async fn list_exports(&self, user_id: Uuid) -> Result<Vec<VideoExportDto>, VideoExportError> {
        let exports = self
            .video_export_repo
            .list(user_id)
            .await
            .map_err(VideoExportError::Internal)?;

        Ok(exports.into_iter().map(VideoExportDto::from).collect())
    }
}
