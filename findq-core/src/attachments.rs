//! Ping photo attachments
//!
//! Uploaded photos live on disk next to the other static assets, one file
//! per `qr_code_ping_image` row, named `{image_id}.{ext}`. The extension is
//! taken verbatim from the uploaded filename, case preserved.

use std::path::{Path, PathBuf};

use crate::error::DbError;
use crate::models::ValidationError;

/// Longest accepted file extension
const MAX_EXTENSION_LEN: usize = 16;

/// An uploaded binary with its original filename
#[derive(Clone)]
pub struct Attachment {
    filename: String,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Accept an upload.
    ///
    /// The filename must end in `.ext` with an ASCII alphanumeric `ext`, since
    /// the extension becomes part of the stored file name.
    ///
    /// # Example
    /// ```
    /// use findq_core::Attachment;
    ///
    /// let photo = Attachment::new("IMG_0042.JPG", vec![0xff, 0xd8]).unwrap();
    /// assert_eq!(photo.extension(), "JPG");
    /// assert!(Attachment::new("no-extension", vec![]).is_err());
    /// assert!(Attachment::new("evil./../x", vec![]).is_err());
    /// ```
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let filename = filename.into();
        validate_extension(&filename)?;
        Ok(Self { filename, bytes })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Text after the last `.` of the filename.
    pub fn extension(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn validate_extension(filename: &str) -> Result<(), ValidationError> {
    const FIELD: &str = "attachment filename";

    let Some((_, ext)) = filename.rsplit_once('.') else {
        return Err(ValidationError::InvalidFormat {
            field: FIELD,
            reason: "must have a file extension",
        });
    };

    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return Err(ValidationError::InvalidFormat {
            field: FIELD,
            reason: "file extension must be 1 to 16 characters",
        });
    }

    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: FIELD,
            reason: "file extension must be alphanumeric",
        });
    }

    Ok(())
}

/// Directory of stored ping photos
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for an image row: `{image_id}.{ext}`
    pub fn file_name(image_id: i64, extension: &str) -> String {
        format!("{}.{}", image_id, extension)
    }

    /// Where the attachment for image row `image_id` is stored.
    pub fn path_for(&self, image_id: i64, attachment: &Attachment) -> PathBuf {
        self.dir
            .join(Self::file_name(image_id, attachment.extension()))
    }

    /// Write the attachment for image row `image_id`.
    ///
    /// A write that fails partway removes whatever reached the disk.
    pub async fn save(&self, image_id: i64, attachment: &Attachment) -> Result<PathBuf, DbError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DbError::attachment(&self.dir, e))?;

        let path = self.path_for(image_id, attachment);
        if let Err(err) = tokio::fs::write(&path, attachment.bytes()).await {
            remove_quietly(&path);
            return Err(DbError::attachment(&path, err));
        }

        tracing::debug!(
            image_id,
            path = %path.display(),
            upload = attachment.filename(),
            bytes = attachment.bytes().len(),
            "attachment stored"
        );
        Ok(path)
    }

    /// Find the stored file for `image_id`, whatever its extension.
    pub async fn locate(&self, image_id: i64) -> Result<Option<PathBuf>, DbError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(DbError::attachment(&self.dir, err)),
        };

        let wanted = image_id.to_string();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DbError::attachment(&self.dir, e))?
        {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(wanted.as_str()) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }
}

/// Best-effort removal; a file that is already gone is fine.
fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove orphaned attachment");
        }
    }
}

/// Files written for rows that are not committed yet.
///
/// Dropping the guard removes every registered file unless [`keep`] was
/// called first. Register a path before writing to it, so a write that is
/// interrupted (an error or the future being dropped) is cleaned up too.
///
/// [`keep`]: PendingFiles::keep
#[derive(Debug, Default)]
pub struct PendingFiles {
    paths: Vec<PathBuf>,
}

impl PendingFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// The rows are committed: leave the files in place.
    pub fn keep(mut self) {
        self.paths.clear();
    }
}

impl Drop for PendingFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            remove_quietly(&path);
        }
    }
}
