//! findq CLI - QR code location registry
//!
//! Entry point for the `findq` binary:
//! - `init-db` creates the tables and static directories
//! - `serve` runs the JSON API
//! - `user` / `code` cover small admin tasks without the server

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use config::FindqConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "findq",
    author,
    version,
    about = "QR code location registry: register codes, collect geotagged pings"
)]
struct Cli {
    /// Config file (default: ~/.findq/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Database URL (overrides config)
    #[arg(long, global = true, env = "FINDQ_DATABASE_URL")]
    database_url: Option<String>,

    /// Static root holding artifacts and ping photos (overrides config)
    #[arg(long, global = true, env = "FINDQ_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database tables and static directories
    InitDb,
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Manage users
    User(commands::user::UserArgs),
    /// Manage QR codes and their artifacts
    Code(commands::code::CodeArgs),
}

impl Cli {
    /// Config file values with command-line overrides applied.
    fn resolve_config(&self) -> Result<FindqConfig> {
        let mut config = FindqConfig::load(self.config.as_deref())?;
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.static_dir = dir.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let config = cli.resolve_config()?;
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Commands::InitDb => commands::run_init_db(&config).await?,
        Commands::Serve(args) => commands::run_serve(args, config).await?,
        Commands::User(args) => commands::run_user(args, &config).await?,
        Commands::Code(args) => commands::run_code(args, &config).await?,
    }
    Ok(())
}
