//! findq configuration
//!
//! Read from `~/.findq/config.toml` (or `--config <path>`). Every key is
//! optional; missing keys fall back to paths under `~/.findq`.
//!
//! ```toml
//! database_url = "sqlite:///srv/findq/findq.sqlite"
//! static_dir = "/srv/findq/static"
//! bind = "0.0.0.0:5000"
//! public_base_url = "findq.example.net"
//! artifact_format = "svg"
//! cors_permissive = false
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use findq_core::artifacts::DEFAULT_PUBLIC_BASE_URL;
use findq_core::{ArtifactConfig, ArtifactFormat, StaticLayout};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindqConfig {
    pub database_url: String,
    pub static_dir: PathBuf,
    pub bind: SocketAddr,
    pub public_base_url: String,
    pub artifact_format: ArtifactFormat,
    /// Overrides `<static_dir>/logo.png`
    pub logo: Option<PathBuf>,
    pub cors_permissive: bool,
}

impl Default for FindqConfig {
    fn default() -> Self {
        let home = findq_home();
        Self {
            database_url: format!("sqlite://{}", home.join("findq.sqlite").display()),
            static_dir: home.join("static"),
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            artifact_format: ArtifactFormat::default(),
            logo: None,
            cors_permissive: false,
        }
    }
}

/// `~/.findq`
pub fn findq_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".findq")
}

impl FindqConfig {
    /// Get config file path: ~/.findq/config.toml
    pub fn config_path() -> PathBuf {
        findq_home().join("config.toml")
    }

    /// Load the explicit file, or the default file when it exists.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Config not found at {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid TOML")
    }

    pub fn layout(&self) -> StaticLayout {
        StaticLayout::new(&self.static_dir)
    }

    /// Artifact settings, falling back to the logo inside the static root.
    pub fn artifact_config(&self) -> ArtifactConfig {
        let layout = self.layout();
        ArtifactConfig {
            dir: layout.artifacts_dir(),
            format: self.artifact_format,
            public_base_url: self.public_base_url.clone(),
            logo: self.logo.clone().or_else(|| layout.logo()),
        }
    }
}
