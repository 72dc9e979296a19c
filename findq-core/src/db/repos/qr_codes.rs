//! QR code repository
//!
//! Rows only. Rendering the scannable artifact is a separate, explicit
//! step (see [`crate::artifacts::ArtifactStore::ensure_artifact`]), so
//! loading a code never touches the filesystem.

use chrono::NaiveDateTime;
use futures::stream::Stream;
use serde::Serialize;
use sqlx::FromRow;

use super::{QrCodePing, User};
use crate::db::entity::{self, Entity, RELATED_PAGE_SIZE};
use crate::db::UnitOfWork;
use crate::error::DbError;
use crate::models::Description;

/// QR code record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct QrCode {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl Entity for QrCode {
    const TABLE: &'static str = "qr_code";
    const RESOURCE: &'static str = "qr code";

    fn id(&self) -> i64 {
        self.id
    }
}

/// QR code repository
pub struct QrCodeRepo<'a> {
    uow: &'a mut UnitOfWork,
}

impl<'a> QrCodeRepo<'a> {
    pub fn new(uow: &'a mut UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn get(&mut self, id: i64) -> Result<QrCode, DbError> {
        entity::load_by_id(self.uow, id).await
    }

    /// Insert a code for `user_id`, returning the new id.
    ///
    /// Fails with [`DbError::Constraint`] if the user does not exist.
    pub async fn create(&mut self, user_id: i64, description: &Description) -> Result<i64, DbError> {
        let id = sqlx::query("INSERT INTO qr_code (user_id, description) VALUES (?, ?)")
            .bind(user_id)
            .bind(description.as_str())
            .execute(self.uow.conn().await?)
            .await?
            .last_insert_rowid();

        tracing::info!(qr_code_id = id, user_id, "qr code created");
        Ok(id)
    }

    /// The user owning `code`.
    pub async fn owner(&mut self, code: &QrCode) -> Result<User, DbError> {
        entity::load_by_id(self.uow, code.user_id).await
    }

    /// Pings submitted against the code, oldest first.
    pub fn pings(self, qr_code_id: i64) -> impl Stream<Item = Result<QrCodePing, DbError>> + Send + 'a {
        entity::related(self.uow, "qr_code_id", qr_code_id, RELATED_PAGE_SIZE)
    }
}
