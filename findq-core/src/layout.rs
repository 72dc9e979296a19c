//! Static directory layout
//!
//! Everything the presentation layer serves lives under one static root:
//!
//! ```text
//! <root>/logo.png              branding embedded into PNG artifacts
//! <root>/qr_images/{id}.png    rendered QR artifacts (or .svg)
//! <root>/qr_ping_images/{id}.* uploaded ping photos
//! ```

use std::path::{Path, PathBuf};

/// Subdirectory holding rendered QR artifacts
pub const ARTIFACT_SUBDIR: &str = "qr_images";

/// Subdirectory holding ping photos
pub const ATTACHMENT_SUBDIR: &str = "qr_ping_images";

/// Default logo file name
pub const LOGO_FILE: &str = "logo.png";

#[derive(Debug, Clone)]
pub struct StaticLayout {
    root: PathBuf,
}

impl StaticLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join(ARTIFACT_SUBDIR)
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.root.join(ATTACHMENT_SUBDIR)
    }

    /// Logo path, only if the file is actually present.
    pub fn logo(&self) -> Option<PathBuf> {
        let path = self.root.join(LOGO_FILE);
        path.is_file().then_some(path)
    }
}
