//! Error types for findq-core
//!
//! Repository errors are never recovered locally; they propagate to the
//! boundary layer which decides what the caller gets to see.

use std::io;
use std::path::PathBuf;

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Storage and repository errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Lookup by id matched no row
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Insert or schema violated a unique, foreign-key, not-null or check constraint
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The store could not be opened or a connection could not be acquired
    #[error("store unreachable: {0}")]
    Connection(#[source] sqlx::Error),

    /// Any other driver failure
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Writing or removing a ping image file failed
    #[error("attachment storage failed for {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DbError {
    /// Create a not-found error for a numeric id
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create an attachment storage error
    pub fn attachment(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Attachment {
            path: path.into(),
            source,
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if matches!(
                    db.kind(),
                    ErrorKind::UniqueViolation
                        | ErrorKind::ForeignKeyViolation
                        | ErrorKind::NotNullViolation
                        | ErrorKind::CheckViolation
                ) =>
            {
                Self::Constraint(db.message().to_owned())
            }
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::Connection(err),
            _ => Self::Database(err),
        }
    }
}

/// QR artifact rendering errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Payload could not be encoded as a QR symbol
    #[error("failed to encode QR payload: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// Logo image could not be read or decoded
    #[error("failed to load logo {}: {source}", .path.display())]
    Logo {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Raster encoding failed
    #[error("failed to render PNG artifact: {0}")]
    Render(#[from] image::ImageError),

    /// Filesystem write failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
