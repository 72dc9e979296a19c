//! Ping repository
//!
//! A ping is one geotagged check-in against a code. Creating a ping also
//! stores its photos: the ping row, one image row per photo and the photo
//! files are committed together, so rows and files never disagree.

use chrono::NaiveDateTime;
use futures::stream::Stream;
use serde::Serialize;
use sqlx::{Connection, FromRow, Sqlite, Transaction};

use super::{ping_images, QrCode, QrCodePingImage};
use crate::attachments::{Attachment, AttachmentStore, PendingFiles};
use crate::db::entity::{self, Entity, RELATED_PAGE_SIZE};
use crate::db::UnitOfWork;
use crate::error::DbError;
use crate::models::Coordinates;

/// Ping record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct QrCodePing {
    pub id: i64,
    pub qr_code_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl Entity for QrCodePing {
    const TABLE: &'static str = "qr_code_ping";
    const RESOURCE: &'static str = "ping";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Fields for a new ping
#[derive(Debug, Clone, Copy)]
pub struct NewPing<'a> {
    pub qr_code_id: i64,
    pub coordinates: Coordinates,
    pub description: &'a str,
}

/// Ping repository
pub struct PingRepo<'a> {
    uow: &'a mut UnitOfWork,
}

impl<'a> PingRepo<'a> {
    pub fn new(uow: &'a mut UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn get(&mut self, id: i64) -> Result<QrCodePing, DbError> {
        entity::load_by_id(self.uow, id).await
    }

    /// Insert a ping with its photos, returning the new ping id.
    ///
    /// Each attachment gets an image row and a file `{image_id}.{ext}` in
    /// `store`. Until the commit succeeds the files are only pending: an
    /// error, or this future being dropped midway, rolls the transaction
    /// back and removes them.
    pub async fn create(
        &mut self,
        new: NewPing<'_>,
        attachments: &[Attachment],
        store: &AttachmentStore,
    ) -> Result<i64, DbError> {
        let mut pending = PendingFiles::new();
        let mut tx = self.uow.conn().await?.begin().await?;

        let ping_id = sqlx::query(
            "INSERT INTO qr_code_ping (qr_code_id, lat, lon, description) VALUES (?, ?, ?, ?)",
        )
        .bind(new.qr_code_id)
        .bind(new.coordinates.lat())
        .bind(new.coordinates.lon())
        .bind(new.description)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        store_images(&mut tx, ping_id, attachments, store, &mut pending).await?;
        tx.commit().await?;
        pending.keep();

        tracing::info!(
            ping_id,
            qr_code_id = new.qr_code_id,
            images = attachments.len(),
            "ping created"
        );
        Ok(ping_id)
    }

    /// The code this ping was submitted against.
    pub async fn qr_code(&mut self, ping: &QrCodePing) -> Result<QrCode, DbError> {
        entity::load_by_id(self.uow, ping.qr_code_id).await
    }

    /// Most recent ping on any of the user's codes, if there is one.
    pub async fn latest_for_user(&mut self, user_id: i64) -> Result<Option<QrCodePing>, DbError> {
        let ping = sqlx::query_as::<_, QrCodePing>(
            r#"
            SELECT p.*
            FROM qr_code_ping p
            JOIN qr_code c ON c.id = p.qr_code_id
            WHERE c.user_id = ?
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.uow.conn().await?)
        .await?;

        Ok(ping)
    }

    /// Images attached to the ping, in upload order.
    pub fn images(self, ping_id: i64) -> impl Stream<Item = Result<QrCodePingImage, DbError>> + Send + 'a {
        entity::related(self.uow, "qr_code_ping_id", ping_id, RELATED_PAGE_SIZE)
    }
}

async fn store_images(
    tx: &mut Transaction<'_, Sqlite>,
    ping_id: i64,
    attachments: &[Attachment],
    store: &AttachmentStore,
    pending: &mut PendingFiles,
) -> Result<(), DbError> {
    for attachment in attachments {
        let image_id = ping_images::insert_row(&mut **tx, ping_id).await?;
        pending.register(store.path_for(image_id, attachment));
        store.save(image_id, attachment).await?;
    }
    Ok(())
}
