//! User repository
//!
//! A user owns many QR codes; their pings are reached through the codes.

use chrono::NaiveDateTime;
use futures::stream::{self, Stream};
use serde::Serialize;
use sqlx::FromRow;

use super::{QrCode, QrCodePing};
use crate::db::entity::{self, Entity, KeysetCursor, RELATED_PAGE_SIZE};
use crate::db::UnitOfWork;
use crate::error::DbError;
use crate::models::Username;

/// User record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: NaiveDateTime,
}

impl Entity for User {
    const TABLE: &'static str = "user";
    const RESOURCE: &'static str = "user";

    fn id(&self) -> i64 {
        self.id
    }
}

/// User repository
pub struct UserRepo<'a> {
    uow: &'a mut UnitOfWork,
}

impl<'a> UserRepo<'a> {
    pub fn new(uow: &'a mut UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn get(&mut self, id: i64) -> Result<User, DbError> {
        entity::load_by_id(self.uow, id).await
    }

    /// Insert a user, returning the new id.
    ///
    /// Fails with [`DbError::Constraint`] if the username is taken.
    pub async fn create(&mut self, username: &Username) -> Result<i64, DbError> {
        let id = sqlx::query("INSERT INTO user (username) VALUES (?)")
            .bind(username.as_str())
            .execute(self.uow.conn().await?)
            .await?
            .last_insert_rowid();

        tracing::info!(user_id = id, username = username.as_str(), "user created");
        Ok(id)
    }

    /// The user's codes in creation order.
    pub fn qr_codes(self, user_id: i64) -> impl Stream<Item = Result<QrCode, DbError>> + Send + 'a {
        entity::related(self.uow, "user_id", user_id, RELATED_PAGE_SIZE)
    }

    /// Every ping on every code the user owns.
    ///
    /// This is a concatenation: all pings of the first code, then all pings
    /// of the second, and so on. There is no ordering across codes.
    pub fn qr_code_pings(
        self,
        user_id: i64,
    ) -> impl Stream<Item = Result<QrCodePing, DbError>> + Send + 'a {
        let walk = PingWalk {
            uow: self.uow,
            codes: KeysetCursor::new("user_id", user_id, RELATED_PAGE_SIZE),
            pings: None,
        };
        stream::try_unfold(walk, PingWalk::step)
    }
}

/// Nested walk: codes of one user, pings of the current code.
struct PingWalk<'a> {
    uow: &'a mut UnitOfWork,
    codes: KeysetCursor<QrCode>,
    pings: Option<KeysetCursor<QrCodePing>>,
}

impl<'a> PingWalk<'a> {
    async fn step(mut self) -> Result<Option<(QrCodePing, Self)>, DbError> {
        loop {
            if let Some(pings) = self.pings.as_mut() {
                if let Some(ping) = pings.next(&mut *self.uow).await? {
                    return Ok(Some((ping, self)));
                }
            }

            match self.codes.next(&mut *self.uow).await? {
                Some(code) => {
                    self.pings = Some(KeysetCursor::new(
                        "qr_code_id",
                        code.id,
                        RELATED_PAGE_SIZE,
                    ));
                }
                None => return Ok(None),
            }
        }
    }
}
