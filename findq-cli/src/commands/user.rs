//! `findq user` - account administration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use findq_core::db::UserRepo;
use findq_core::models::Username;
use findq_core::UnitOfWork;

use super::open_pool;
use crate::config::FindqConfig;

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user and print its id
    Add {
        /// Login name (no whitespace)
        username: String,
    },
    /// Show one user
    Show {
        /// User id
        id: i64,
    },
}

pub async fn run_user(args: UserArgs, config: &FindqConfig) -> Result<()> {
    let mut uow = UnitOfWork::new(open_pool(config).await?);
    let mut users = UserRepo::new(&mut uow);

    match args.command {
        UserCommands::Add { username } => {
            let username = Username::new(&username)?;
            let id = users
                .create(&username)
                .await
                .with_context(|| format!("Failed to create user {}", username.as_str()))?;
            println!("{}", id);
        }
        UserCommands::Show { id } => {
            let user = users.get(id).await?;
            println!("{}\t{}\t{}", user.id, user.username, user.created_at);
        }
    }
    Ok(())
}
