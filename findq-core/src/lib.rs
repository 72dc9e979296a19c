//! findq-core: persistence and artifact layer for findq
//!
//! Users register physical locations as QR codes; anyone scanning a code
//! submits a geotagged ping (coordinates, note, photos) back to the owner.
//! This crate owns the relational store, the validated input types, the
//! on-disk photo attachments and the rendered QR artifacts.

pub mod artifacts;
pub mod attachments;
pub mod db;
pub mod error;
pub mod layout;
pub mod models;

pub use artifacts::{ArtifactConfig, ArtifactFormat, ArtifactStore, EnsuredArtifact};
pub use attachments::{Attachment, AttachmentStore, PendingFiles};
pub use db::{create_pool, create_schema, UnitOfWork};
pub use error::{ArtifactError, DbError};
pub use layout::StaticLayout;
pub use models::ValidationError;
