//! QR artifact generation
//!
//! Each code has one scannable image encoding `{public_base_url}/p/{id}`,
//! the page where a finder submits a ping. Artifacts are rendered on
//! demand and cached by file presence: [`ArtifactStore::ensure_artifact`]
//! renders only when `{dir}/{id}.{ext}` does not exist yet.
//!
//! Two concurrent first accesses may both render; the output is identical
//! and each write lands atomically, so the race is harmless.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;

/// Default host encoded into every code
pub const DEFAULT_PUBLIC_BASE_URL: &str = "findq.francisdb.net";

/// Minimum rendered edge, in pixels
const MIN_DIMENSION: u32 = 300;

/// Logo edge as a fraction of the code edge (1/LOGO_RATIO)
const LOGO_RATIO: u32 = 4;

/// Output format of rendered artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// Raster, with the logo embedded
    #[default]
    Png,
    /// Vector, no logo
    Svg,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArtifactFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(format!("unknown artifact format '{}' (expected png or svg)", other)),
        }
    }
}

/// Where and how artifacts are rendered
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Output directory, usually `<static>/qr_images`
    pub dir: PathBuf,
    pub format: ArtifactFormat,
    /// Host (and optional path prefix) encoded before `/p/{id}`
    pub public_base_url: String,
    /// Branding embedded in the centre of PNG artifacts
    pub logo: Option<PathBuf>,
}

impl ArtifactConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: ArtifactFormat::default(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_owned(),
            logo: None,
        }
    }
}

/// Result of [`ArtifactStore::ensure_artifact`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredArtifact {
    pub path: PathBuf,
    /// False when the file already existed and nothing was rendered
    pub created: bool,
}

/// Renders and caches QR artifacts on disk
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    config: ArtifactConfig,
}

impl ArtifactStore {
    pub fn new(config: ArtifactConfig) -> Self {
        Self { config }
    }

    pub fn format(&self) -> ArtifactFormat {
        self.config.format
    }

    /// `{id}.{ext}`
    pub fn file_name(&self, qr_code_id: i64) -> String {
        format!("{}.{}", qr_code_id, self.config.format.extension())
    }

    pub fn path_for(&self, qr_code_id: i64) -> PathBuf {
        self.config.dir.join(self.file_name(qr_code_id))
    }

    /// The string encoded in the code.
    ///
    /// ```
    /// use findq_core::{ArtifactConfig, ArtifactStore};
    ///
    /// let store = ArtifactStore::new(ArtifactConfig::new("/tmp/qr_images"));
    /// assert_eq!(store.payload_for(7), "findq.francisdb.net/p/7");
    /// ```
    pub fn payload_for(&self, qr_code_id: i64) -> String {
        format!(
            "{}/p/{}",
            self.config.public_base_url.trim_end_matches('/'),
            qr_code_id
        )
    }

    /// Render the artifact for `qr_code_id` unless it already exists.
    ///
    /// Blocking: call from `spawn_blocking` inside async code.
    pub fn ensure_artifact(&self, qr_code_id: i64) -> Result<EnsuredArtifact, ArtifactError> {
        let path = self.path_for(qr_code_id);
        if path.exists() {
            tracing::debug!(qr_code_id, path = %path.display(), "artifact already present");
            return Ok(EnsuredArtifact {
                path,
                created: false,
            });
        }

        std::fs::create_dir_all(&self.config.dir)
            .map_err(|e| ArtifactError::io(&self.config.dir, e))?;

        let code = QrCode::with_error_correction_level(self.payload_for(qr_code_id), EcLevel::H)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.config.dir)
            .map_err(|e| ArtifactError::io(&self.config.dir, e))?;

        match self.config.format {
            ArtifactFormat::Png => {
                let image = self.render_png(&code)?;
                image.write_to(tmp.as_file_mut(), ImageFormat::Png)?;
            }
            ArtifactFormat::Svg => {
                let markup = code
                    .render::<svg::Color<'_>>()
                    .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
                    .build();
                tmp.write_all(markup.as_bytes())
                    .map_err(|e| ArtifactError::io(tmp.path(), e))?;
            }
        }

        tmp.persist(&path)
            .map_err(|e| ArtifactError::io(&path, e.error))?;

        tracing::info!(qr_code_id, path = %path.display(), "artifact rendered");
        Ok(EnsuredArtifact {
            path,
            created: true,
        })
    }

    fn render_png(&self, code: &QrCode) -> Result<RgbaImage, ArtifactError> {
        let mut image = code
            .render::<Rgba<u8>>()
            .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
            .build();

        if let Some(logo_path) = &self.config.logo {
            let logo = image::open(logo_path).map_err(|source| ArtifactError::Logo {
                path: logo_path.clone(),
                source,
            })?;

            let edge = (image.width() / LOGO_RATIO).max(1);
            let logo = logo.resize(edge, edge, FilterType::Lanczos3).to_rgba8();

            let x = i64::from((image.width() - logo.width()) / 2);
            let y = i64::from((image.height() - logo.height()) / 2);
            imageops::overlay(&mut image, &logo, x, y);
        }

        Ok(image)
    }
}
