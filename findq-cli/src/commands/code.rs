//! `findq code` - register codes and render their artifacts

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use findq_core::db::{QrCodeRepo, UserRepo};
use findq_core::models::Description;
use findq_core::UnitOfWork;
use futures::TryStreamExt;

use super::{artifact_store, open_pool};
use crate::config::FindqConfig;

#[derive(Parser, Debug)]
pub struct CodeArgs {
    #[command(subcommand)]
    pub command: CodeCommands,
}

#[derive(Subcommand, Debug)]
pub enum CodeCommands {
    /// Register a code for a user and render its artifact
    Add {
        /// Owning user id
        #[arg(long)]
        user: i64,
        /// Where the code will be stuck, e.g. "Front Door"
        description: String,
    },
    /// Render a code's artifact if it is missing and print its path
    Render {
        /// Code id
        id: i64,
    },
    /// List a user's codes
    List {
        /// Owning user id
        #[arg(long)]
        user: i64,
    },
}

pub async fn run_code(args: CodeArgs, config: &FindqConfig) -> Result<()> {
    let mut uow = UnitOfWork::new(open_pool(config).await?);
    let artifacts = artifact_store(config);

    match args.command {
        CodeCommands::Add { user, description } => {
            let description = Description::new(&description)?;
            let id = QrCodeRepo::new(&mut uow)
                .create(user, &description)
                .await
                .with_context(|| format!("Failed to create code for user {}", user))?;
            let artifact = artifacts
                .ensure_artifact(id)
                .context("Failed to render artifact")?;
            println!("{}\t{}", id, artifact.path.display());
        }
        CodeCommands::Render { id } => {
            QrCodeRepo::new(&mut uow).get(id).await?;
            let artifact = artifacts
                .ensure_artifact(id)
                .context("Failed to render artifact")?;
            let state = if artifact.created { "rendered" } else { "cached" };
            println!("{}\t{}", artifact.path.display(), state);
        }
        CodeCommands::List { user } => {
            UserRepo::new(&mut uow).get(user).await?;
            let codes: Vec<_> = UserRepo::new(&mut uow).qr_codes(user).try_collect().await?;
            for code in codes {
                println!(
                    "{}\t{}\t{}\t{}",
                    code.id,
                    code.description,
                    code.created_at,
                    artifacts.payload_for(code.id)
                );
            }
        }
    }
    Ok(())
}
