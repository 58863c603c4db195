use std::sync::Arc;

use chrono::Utc;
use domain::{
    entities::folders::InsertFolderEntity,
    repositories::{
        app_users::AppUserRepository, folders::FolderRepository,
        subscriptions::SubscriptionRepository, usage_counts::UsageCountsRepository,
    },
    value_objects::{
        folders::{CreateFolderModel, FolderDto, RenameFolderModel},
        plans::ResourceKind,
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
pub enum FolderError {
    #[error("folder not found")]
    NotFound,
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl FolderError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            FolderError::NotFound => StatusCode::NOT_FOUND,
            FolderError::Admission(err) => err.status_code(),
            FolderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct FolderUseCase<R, C, A, S>
where
    R: FolderRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    folder_repo: Arc<R>,
    usage_usecase: Arc<UsageUseCase<C, A, S>>,
}

impl<R, C, A, S> FolderUseCase<R, C, A, S>
where
    R: FolderRepository + Send + Sync + 'static,
    C: UsageCountsRepository + Send + Sync + 'static,
    A: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(folder_repo: Arc<R>, usage_usecase: Arc<UsageUseCase<C, A, S>>) -> Self {
        Self {
            folder_repo,
            usage_usecase,
        }
    }

    pub async fn create_folder(
        &self,
        user_id: Uuid,
        model: CreateFolderModel,
    ) -> Result<FolderDto, FolderError> {
        info!(%user_id, name = %model.name, "folders: create requested");

        let usage = self
            .usage_usecase
            .get_user_usage(user_id)
            .await
            .map_err(AdmissionError::from)?;
        ensure_capacity(&usage, ResourceKind::Folders).map_err(|err| {
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "folders: create denied by plan ceiling"
            );
            err
        })?;

        let now = Utc::now();
        let created = self
            .folder_repo
            .create(InsertFolderEntity {
                user_id,
                name: model.name,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "folders: create failed");
                FolderError::Internal(err)
            })?;

        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, folder_id = %created.id, "folders: created");
        Ok(created.into())
    }

    pub async fn rename_folder(
        &self,
        user_id: Uuid,
        folder_id: Uuid,
        model: RenameFolderModel,
    ) -> Result<FolderDto, FolderError> {
        let renamed = self
            .folder_repo
            .rename(user_id, folder_id, model.name)
            .await
            .map_err(|err| {
                error!(%user_id, %folder_id, db_error = ?err, "folders: rename failed");
                FolderError::Internal(err)
            })?
            .ok_or(FolderError::NotFound)?;

        Ok(renamed.into())
    }

    pub async fn delete_folder(&self, user_id: Uuid, folder_id: Uuid) -> Result<(), FolderError> {
        let deleted = self
            .folder_repo
            .delete(user_id, folder_id)
            .await
            .map_err(|err| {
                error!(%user_id, %folder_id, db_error = ?err, "folders: delete failed");
                FolderError::Internal(err)
            })?;

        if !deleted {
            return Err(FolderError::NotFound);
        }

        self.usage_usecase.invalidate(user_id).await;

        info!(%user_id, %folder_id, "folders: deleted");
        Ok(())
    }

    pub async fn list_folders(&self, user_id: Uuid) -> Result<Vec<FolderDto>, FolderError> {
        let folders = self
            .folder_repo
            .list(user_id)
            .await
            .map_err(FolderError::Internal)?;

        Ok(folders.into_iter().map(FolderDto::from).collect())
    }
}
