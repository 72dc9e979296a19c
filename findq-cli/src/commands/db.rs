//! `findq init-db`

use anyhow::{Context, Result};
use findq_core::create_schema;

use super::open_pool;
use crate::config::FindqConfig;

/// Create the tables and the static directories.
pub async fn run_init_db(config: &FindqConfig) -> Result<()> {
    let pool = open_pool(config).await?;
    create_schema(&pool)
        .await
        .context("Failed to create schema")?;

    let layout = config.layout();
    for dir in [layout.artifacts_dir(), layout.attachments_dir()] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    tracing::info!(database = %config.database_url, static_dir = %layout.root().display(), "initialized");
    println!("Database created.");
    Ok(())
}
