//! Application state shared across handlers

use std::path::Path;
use std::sync::Arc;

use findq_core::layout::{ARTIFACT_SUBDIR, ATTACHMENT_SUBDIR};
use findq_core::{ArtifactStore, AttachmentStore, EnsuredArtifact, StaticLayout, UnitOfWork};
use sqlx::SqlitePool;

use crate::http::ApiError;
use crate::views;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    layout: StaticLayout,
    artifacts: ArtifactStore,
    attachments: AttachmentStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, layout: StaticLayout, artifacts: ArtifactStore) -> Self {
        let attachments = AttachmentStore::new(layout.attachments_dir());
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                layout,
                artifacts,
                attachments,
            }),
        }
    }

    pub fn layout(&self) -> &StaticLayout {
        &self.inner.layout
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.inner.artifacts
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.inner.attachments
    }

    /// Fresh unit of work for one request.
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(self.inner.pool.clone())
    }

    /// Render the code's artifact if it is not on disk yet.
    ///
    /// Rendering is CPU and file bound, so it runs on the blocking pool.
    pub async fn ensure_artifact(&self, qr_code_id: i64) -> Result<EnsuredArtifact, ApiError> {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.inner.artifacts.ensure_artifact(qr_code_id))
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("artifact task failed: {}", e),
            })?
            .map_err(ApiError::from)
    }

    /// Public URL of a code's artifact
    pub fn artifact_url(&self, qr_code_id: i64) -> String {
        views::static_url(ARTIFACT_SUBDIR, &self.inner.artifacts.file_name(qr_code_id))
    }

    /// Public URL of a stored ping photo
    pub fn attachment_url(&self, path: &Path) -> Option<String> {
        let file_name = path.file_name()?.to_str()?;
        Some(views::static_url(ATTACHMENT_SUBDIR, file_name))
    }
}
