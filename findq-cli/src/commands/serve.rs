//! HTTP server command

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use findq_core::{create_schema, ArtifactFormat};
use findq_server::{run_server, AppState, ServerConfig};

use super::{artifact_store, open_pool};
use crate::config::FindqConfig;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:5000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Artifact format for newly rendered codes (png or svg)
    #[arg(long)]
    pub format: Option<ArtifactFormat>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: FindqConfig) -> Result<()> {
    if let Some(format) = args.format {
        config.artifact_format = format;
    }

    let pool = open_pool(&config).await?;
    create_schema(&pool)
        .await
        .context("Failed to create schema")?;

    let state = AppState::new(pool, config.layout(), artifact_store(&config));
    let server = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.bind),
        cors_permissive: args.cors_permissive || config.cors_permissive,
    };

    tracing::info!("Starting findq server on {}", server.bind_addr);
    run_server(state, server).await.context("Server error")?;

    Ok(())
}
