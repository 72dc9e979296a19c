//! Ping image repository
//!
//! An image row is only the link between a ping and a file on disk named
//! after the row id. The file itself is handled by
//! [`crate::attachments::AttachmentStore`].

use serde::Serialize;
use sqlx::{Executor, FromRow, Sqlite};

use crate::db::entity::{self, Entity};
use crate::db::UnitOfWork;
use crate::error::DbError;

/// Ping image record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct QrCodePingImage {
    pub id: i64,
    pub qr_code_ping_id: i64,
}

impl Entity for QrCodePingImage {
    const TABLE: &'static str = "qr_code_ping_image";
    const RESOURCE: &'static str = "ping image";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Ping image repository
pub struct PingImageRepo<'a> {
    uow: &'a mut UnitOfWork,
}

impl<'a> PingImageRepo<'a> {
    pub fn new(uow: &'a mut UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn get(&mut self, id: i64) -> Result<QrCodePingImage, DbError> {
        entity::load_by_id(self.uow, id).await
    }

    /// Insert an image row for `qr_code_ping_id`, returning the new id.
    pub async fn create(&mut self, qr_code_ping_id: i64) -> Result<i64, DbError> {
        insert_row(self.uow.conn().await?, qr_code_ping_id).await
    }
}

/// Insert one image row on any executor (plain connection or transaction).
pub(crate) async fn insert_row<'c, X>(executor: X, qr_code_ping_id: i64) -> Result<i64, DbError>
where
    X: Executor<'c, Database = Sqlite>,
{
    let id = sqlx::query("INSERT INTO qr_code_ping_image (qr_code_ping_id) VALUES (?)")
        .bind(qr_code_ping_id)
        .execute(executor)
        .await?
        .last_insert_rowid();

    Ok(id)
}
