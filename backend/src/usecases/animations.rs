use std::sync::Arc;

use chrono::Utc;
use domain::{
    entities::animations::{InsertAnimationEntity, UpdateAnimationEntity},
    repositories::{
        animations::AnimationRepository, app_users::AppUserRepository,
        subscriptions::SubscriptionRepository, usage_counts::UsageCountsRepository,
    },
    value_objects::{
        animations::{AnimationDto, AnimationSlide, CreateAnimationModel, UpdateAnimationModel},
        plans::{Ceiling, PlanTier, ResourceKind, plan_config, upgrade_target_of},
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
pub enum AnimationError {
    #[error("animation not found")]
    NotFound,
    #[error("animation has {count} slides; the current plan allows {max}")]
    SlideLimitReached {
        count: usize,
        max: i64,
        upgrade_to: Option<PlanTier>,
    },
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AnimationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AnimationError::NotFound => StatusCode::NOT_FOUND,
            AnimationError::SlideLimitReached { .. } => StatusCode::FORBIDDEN,
            AnimationError::Admission(err) => err.status_code(),
            AnimationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Slides-per-animation is a plan ceiling but not a counted resource, so it
/// is enforced at save time rather than through the usage summary.
fn ensure_slide_capacity(tier: PlanTier, slides: &[AnimationSlide]) -> Result<(), AnimationError> {
    match plan_config(tier).max_slides_per_animation {
        Ceiling::Unlimited => Ok(()),
        Ceiling::Finite(max) if (slides.len() as i64) <= max => Ok(()),
        Ceiling::Finite(max) => Err(AnimationError::SlideLimitReached {
            count: slides.len(),
            max,
            upgrade_to: upgrade_target_of(tier),
        }),
    }
}

pub struct AnimationUseCase<R, C, A, S>
where
    R: AnimationRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    animation_repo: Arc<R>,
    usage_usecase: Arc<UsageUseCase<C, A, S>>,
}

impl<R, C, A, S> AnimationUseCase<R, C, A, S>
where
    R: AnimationRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(animation_repo: Arc<R>, usage_usecase: Arc<UsageUseCase<C, A, S>>) -> Self {
        Self {
            animation_repo,
            usage_usecase,
        }
    }

    pub async fn create_animation(
        &self,
        user_id: Uuid,
        model: CreateAnimationModel,
    ) -> Result<AnimationDto, AnimationError> {
        info!(
            %user_id,
            title = %model.title,
            slide_count = model.slides.len(),
            "animations: create requested"
        );

        let usage = self
            .usage_usecase
            .get_user_usage(user_id)
            .await
            .map_err(AdmissionError::from)?;
        ensure_capacity(&usage, ResourceKind::Animations).map_err(|err| {
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "animations: create denied by plan ceiling"
            );
            err
        })?;
        ensure_slide_capacity(usage.tier, &model.slides).map_err(|err| {
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                slide_count = model.slides.len(),
                "animations: slide count over plan ceiling"
            );
            err
        })?;

        let slides = serde_json::to_value(&model.slides)
            .map_err(|err| AnimationError::Internal(err.into()))?;
        let now = Utc::now();
        let created = self
            .animation_repo
            .create(InsertAnimationEntity {
                user_id,
                title: model.title,
                slides,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "animations: create failed");
                AnimationError::Internal(err)
            })?;

        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, animation_id = %created.id, "animations: created");
        Ok(created.into())
    }

    pub async fn update_animation(
        &self,
        user_id: Uuid,
        animation_id: Uuid,
        model: UpdateAnimationModel,
    ) -> Result<AnimationDto, AnimationError> {
        let slides = match model.slides {
            Some(slides) => {
                // Slide edits do not change counted usage, but the ceiling
                // still applies on every save.
                let usage = self
                    .usage_usecase
                    .get_user_usage(user_id)
                    .await
                    .map_err(AdmissionError::from)?;
                ensure_slide_capacity(usage.tier, &slides)?;

                Some(
                    serde_json::to_value(&slides)
                        .map_err(|err| AnimationError::Internal(err.into()))?,
                )
            }
            None => None,
        };

        let updated = self
            .animation_repo
            .update(
                user_id,
                animation_id,
                UpdateAnimationEntity {
                    title: model.title,
                    slides,
                    updated_at: Some(Utc::now()),
                },
            )
            .await
            .map_err(|err| {
                error!(%user_id, %animation_id, db_error = ?err, "animations: update failed");
                AnimationError::Internal(err)
            })?
            .ok_or(AnimationError::NotFound)?;

        Ok(updated.into())
    }

    pub async fn delete_animation(
        &self,
        user_id: Uuid,
        animation_id: Uuid,
    ) -> Result<(), AnimationError> {
        let deleted = self
            .animation_repo
            .delete(user_id, animation_id)
            .await
            .map_err(|err| {
                error!(%user_id, %animation_id, db_error = ?err, "animations: delete failed");
                AnimationError::Internal(err)
            })?;

        if !deleted {
            return Err(AnimationError::NotFound);
        }

        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, %animation_id, "animations: deleted");
        Ok(())
    }

    pub async fn get_animation(
        &self,
        user_id: Uuid,
        animation_id: Uuid,
    ) -> Result<AnimationDto, AnimationError> {
        let animation = self
            .animation_repo
            .find(user_id, animation_id)
            .await
            .map_err(AnimationError::Internal)?
            .ok_or(AnimationError::NotFound)?;

        Ok(animation.into())
    }

    pub async fn list_animations(&self, user_id: Uuid) -> Result<Vec<AnimationDto>, AnimationError> {
        let animations = self
            .animation_repo
            .list(user_id)
            .await
            .map_err(AnimationError::Internal)?;

        Ok(animations.into_iter().map(AnimationDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides(count: usize) -> Vec<AnimationSlide> {
        (0..count)
            .map(|index| AnimationSlide {
                code: format!("let step = {index};"),
                title: None,
                duration_ms: None,
            })
            .collect()
    }

    #[test]
    fn started_tier_caps_slides_per_animation() {
        assert!(ensure_slide_capacity(PlanTier::Started, &slides(10)).is_ok());

        let err = ensure_slide_capacity(PlanTier::Started, &slides(11)).unwrap_err();
        match err {
            AnimationError::SlideLimitReached {
                count,
                max,
                upgrade_to,
            } => {
                assert_eq!(count, 11);
                assert_eq!(max, 10);
                assert_eq!(upgrade_to, Some(PlanTier::Pro));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pro_tier_has_no_slide_ceiling() {
        assert!(ensure_slide_capacity(PlanTier::Pro, &slides(500)).is_ok());
    }
}
