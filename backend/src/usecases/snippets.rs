use std::sync::Arc;

use chrono::Utc;
use domain::{
    entities::snippets::{InsertSnippetEntity, UpdateSnippetEntity},
    repositories::{
        app_users::AppUserRepository, snippets::SnippetRepository,
        subscriptions::SubscriptionRepository, usage_counts::UsageCountsRepository,
    },
    value_objects::{
        plans::ResourceKind,
        snippets::{CreateSnippetModel, ListSnippetsFilter, SnippetDto, UpdateSnippetModel},
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
pub enum SnippetError {
    #[error("snippet not found")]
    NotFound,
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SnippetError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SnippetError::NotFound => StatusCode::NOT_FOUND,
            SnippetError::Admission(err) => err.status_code(),
            SnippetError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type SnippetResult<T> = std::result::Result<T, SnippetError>;

pub struct SnippetUseCase<R, C, A, S>
where
    R: SnippetRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    snippet_repo: Arc<R>,
    usage_usecase: Arc<UsageUseCase<C, A, S>>,
}

impl<R, C, A, S> SnippetUseCase<R, C, A, S>
where
    R: SnippetRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(snippet_repo: Arc<R>, usage_usecase: Arc<UsageUseCase<C, A, S>>) -> Self {
        Self {
            snippet_repo,
            usage_usecase,
        }
    }

    pub async fn create_snippet(
        &self,
        user_id: Uuid,
        model: CreateSnippetModel,
    ) -> SnippetResult<SnippetDto> {
        info!(%user_id, title = %model.title, "snippets: create requested");

        let usage = self
            .usage_usecase
            .get_user_usage(user_id)
            .await
            .map_err(AdmissionError::from)?;
        ensure_capacity(&usage, ResourceKind::Snippets).map_err(|err| {
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                current = usage.snippets.current,
                "snippets: create denied by plan ceiling"
            );
            err
        })?;

        let now = Utc::now();
        let created = self
            .snippet_repo
            .create(InsertSnippetEntity {
                user_id,
                folder_id: model.folder_id,
                title: model.title,
                language: model.language,
                code: model.code,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "snippets: create failed");
                SnippetError::Internal(err)
            })?;

        // Counted write: invalidate before returning control to the caller.
        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, snippet_id = %created.id, "snippets: created");
        Ok(created.into())
    }

    pub async fn update_snippet(
        &self,
        user_id: Uuid,
        snippet_id: Uuid,
        model: UpdateSnippetModel,
    ) -> SnippetResult<SnippetDto> {
        let folder_id = if model.clear_folder {
            Some(None)
        } else {
            model.folder_id.map(Some)
        };

        let updated = self
            .snippet_repo
            .update(
                user_id,
                snippet_id,
                UpdateSnippetEntity {
                    folder_id,
                    title: model.title,
                    language: model.language,
                    code: model.code,
                    updated_at: Some(Utc::now()),
                },
            )
            .await
            .map_err(|err| {
                error!(%user_id, %snippet_id, db_error = ?err, "snippets: update failed");
                SnippetError::Internal(err)
            })?
            .ok_or(SnippetError::NotFound)?;

        Ok(updated.into())
    }

    pub async fn delete_snippet(&self, user_id: Uuid, snippet_id: Uuid) -> SnippetResult<()> {
        let deleted = self
            .snippet_repo
            .delete(user_id, snippet_id)
            .await
            .map_err(|err| {
                error!(%user_id, %snippet_id, db_error = ?err, "snippets: delete failed");
                SnippetError::Internal(err)
            })?;

        if !deleted {
            warn!(%user_id, %snippet_id, "snippets: delete target not found");
            return Err(SnippetError::NotFound);
        }

        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, %snippet_id, "snippets: deleted");
        Ok(())
    }

    pub async fn get_snippet(&self, user_id: Uuid, snippet_id: Uuid) -> SnippetResult<SnippetDto> {
        let snippet = self
            .snippet_repo
            .find(user_id, snippet_id)
            .await
            .map_err(SnippetError::Internal)?
            .ok_or(SnippetError::NotFound)?;

        Ok(snippet.into())
    }

    pub async fn list_snippets(
        &self,
        user_id: Uuid,
        filter: ListSnippetsFilter,
    ) -> SnippetResult<Vec<SnippetDto>> {
        let snippets = self
            .snippet_repo
            .list(user_id, filter)
            .await
            .map_err(SnippetError::Internal)?;

        Ok(snippets.into_iter().map(SnippetDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;
    use domain::{
        entities::{
            app_users::AppUserEntity, snippets::SnippetEntity, subscriptions::SubscriptionEntity,
        },
        repositories::{
            app_users::MockAppUserRepository, snippets::MockSnippetRepository,
            subscriptions::MockSubscriptionRepository, usage_counts::MockUsageCountsRepository,
        },
        value_objects::usage::ResourceCounts,
    };

    use crate::usecases::{plan_resolver::PlanResolver, usage_cache::UsageCache};

    const BACKEND_TIMEOUT: Duration = Duration::from_secs(3);
    const CACHE_TTL: Duration = Duration::from_secs(5);

    type TestUsage =
        UsageUseCase<MockUsageCountsRepository, MockAppUserRepository, MockSubscriptionRepository>;

    fn mock_profile_repos(
        user_id: Uuid,
        tier: &'static str,
    ) -> (MockAppUserRepository, MockSubscriptionRepository) {
        let mut app_user_repo = MockAppUserRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();

        app_user_repo.expect_find_by_id().returning(|id| {
            let now = Utc::now();
            let user = AppUserEntity {
                id,
                email: Some("user@example.com".to_string()),
                status: "active".to_string(),
                created_at: now,
                updated_at: now,
            };
            Box::pin(async move { Ok(Some(user)) })
        });

        subscription_repo
            .expect_find_current_active_subscription()
            .returning(move |_| {
                let now = Utc::now();
                let subscription = SubscriptionEntity {
                    id: Uuid::new_v4(),
                    user_id,
                    tier: tier.to_string(),
                    billing_interval: "monthly".to_string(),
                    starts_at: now - ChronoDuration::days(1),
                    ends_at: now + ChronoDuration::days(29),
                    cancel_at_period_end: false,
                    canceled_at: None,
                    provider_subscription_id: Some("sub_123".to_string()),
                    status: "active".to_string(),
                    created_at: now,
                };
                Box::pin(async move { Ok(Some(subscription)) })
            });

        (app_user_repo, subscription_repo)
    }

    fn usage_usecase(
        counts_repo: MockUsageCountsRepository,
        app_user_repo: MockAppUserRepository,
        subscription_repo: MockSubscriptionRepository,
    ) -> Arc<TestUsage> {
        let plan_resolver = Arc::new(PlanResolver::new(
            Arc::new(app_user_repo),
            Arc::new(subscription_repo),
            BACKEND_TIMEOUT,
        ));

        Arc::new(UsageUseCase::new(
            Arc::new(counts_repo),
            plan_resolver,
            Arc::new(UsageCache::new(CACHE_TTL)),
            BACKEND_TIMEOUT,
        ))
    }

    fn sample_entity(user_id: Uuid, entity: &InsertSnippetEntity) -> SnippetEntity {
        SnippetEntity {
            id: Uuid::new_v4(),
            user_id,
            folder_id: entity.folder_id,
            title: entity.title.clone(),
            language: entity.language.clone(),
            code: entity.code.clone(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    fn create_model() -> CreateSnippetModel {
        CreateSnippetModel {
            title: "hello".to_string(),
            language: "rust".to_string(),
            code: "fn main() {}".to_string(),
            folder_id: None,
        }
    }

    #[tokio::test]
    async fn create_is_denied_at_the_ceiling_without_touching_the_store() {
        let user_id = Uuid::new_v4();
        let (app_user_repo, subscription_repo) = mock_profile_repos(user_id, "started");

        let mut counts_repo = MockUsageCountsRepository::new();
        counts_repo.expect_fetch_counts().returning(|_| {
            Box::pin(async {
                Ok(ResourceCounts {
                    snippets: 50,
                    ..Default::default()
                })
            })
        });

        let mut snippet_repo = MockSnippetRepository::new();
        snippet_repo.expect_create().times(0);

        let usecase = SnippetUseCase::new(
            Arc::new(snippet_repo),
            usage_usecase(counts_repo, app_user_repo, subscription_repo),
        );

        let err = usecase
            .create_snippet(user_id, create_model())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SnippetError::Admission(AdmissionError::LimitReached { .. })
        ));
    }

    #[tokio::test]
    async fn two_rapid_creates_are_both_reflected_in_the_next_read() {
        let user_id = Uuid::new_v4();
        let (app_user_repo, subscription_repo) = mock_profile_repos(user_id, "started");

        // Shared fake store: creates bump the counter the counts query reads,
        // so a lost invalidation would surface as a stale read below.
        let stored = Arc::new(AtomicI64::new(0));

        let counts = Arc::clone(&stored);
        let mut counts_repo = MockUsageCountsRepository::new();
        counts_repo.expect_fetch_counts().returning(move |_| {
            let snippets = counts.load(Ordering::SeqCst);
            Box::pin(async move {
                Ok(ResourceCounts {
                    snippets,
                    ..Default::default()
                })
            })
        });

        let writes = Arc::clone(&stored);
        let mut snippet_repo = MockSnippetRepository::new();
        snippet_repo.expect_create().times(2).returning(move |entity| {
            writes.fetch_add(1, Ordering::SeqCst);
            let created = sample_entity(entity.user_id, &entity);
            Box::pin(async move { Ok(created) })
        });

        let usage = usage_usecase(counts_repo, app_user_repo, subscription_repo);
        let usecase = SnippetUseCase::new(Arc::new(snippet_repo), Arc::clone(&usage));

        usecase.create_snippet(user_id, create_model()).await.unwrap();
        usecase.create_snippet(user_id, create_model()).await.unwrap();

        let summary = usage.get_user_usage(user_id).await.unwrap();
        assert_eq!(summary.snippets.current, 2);
    }

    #[tokio::test]
    async fn delete_of_a_foreign_snippet_is_not_found() {
        let user_id = Uuid::new_v4();
        let (app_user_repo, subscription_repo) = mock_profile_repos(user_id, "started");

        let mut snippet_repo = MockSnippetRepository::new();
        snippet_repo
            .expect_delete()
            .returning(|_, _| Box::pin(async { Ok(false) }));

        let usecase = SnippetUseCase::new(
            Arc::new(snippet_repo),
            usage_usecase(
                MockUsageCountsRepository::new(),
                app_user_repo,
                subscription_repo,
            ),
        );

        let err = usecase
            .delete_snippet(user_id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, SnippetError::NotFound));
    }
}
