//! Command implementations for the findq CLI

pub mod code;
pub mod db;
pub mod serve;
pub mod user;

pub use code::run_code;
pub use db::run_init_db;
pub use serve::run_serve;
pub use user::run_user;

use std::path::PathBuf;

use anyhow::{Context, Result};
use findq_core::{create_pool, ArtifactStore};
use sqlx::SqlitePool;

use crate::config::FindqConfig;

/// Filesystem path behind a `sqlite:` URL, if it names a file.
fn sqlite_file(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Open the configured store, creating the database's directory first.
pub async fn open_pool(config: &FindqConfig) -> Result<SqlitePool> {
    if let Some(parent) = sqlite_file(&config.database_url)
        .as_deref()
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    create_pool(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))
}

pub fn artifact_store(config: &FindqConfig) -> ArtifactStore {
    ArtifactStore::new(config.artifact_config())
}
