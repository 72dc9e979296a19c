//! Shared shape of the four row types
//!
//! Every table has an integer `id` primary key assigned in insertion order,
//! which lets one keyset cursor serve all "list related rows" navigation.

use std::collections::VecDeque;

use futures::stream::{self, Stream};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use super::UnitOfWork;
use crate::error::DbError;

/// Rows fetched per page when streaming related entities.
pub const RELATED_PAGE_SIZE: u32 = 50;

/// A row type backed by exactly one table.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    /// Table name in the schema
    const TABLE: &'static str;

    /// Name used in NotFound errors
    const RESOURCE: &'static str;

    /// Primary key of this row
    fn id(&self) -> i64;
}

/// Single-row lookup by primary key.
pub async fn load_by_id<E: Entity>(uow: &mut UnitOfWork, id: i64) -> Result<E, DbError> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", E::TABLE);

    sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(uow.conn().await?)
        .await?
        .ok_or_else(|| DbError::not_found(E::RESOURCE, id))
}

/// Pages through rows of `E` whose `foreign_key` equals `parent_id`, in id order.
///
/// Each page is its own query, so the cursor holds no borrow of the
/// connection between calls and several cursors can share one unit of work.
pub(crate) struct KeysetCursor<E> {
    sql: String,
    parent_id: i64,
    after: i64,
    page_size: u32,
    buffer: VecDeque<E>,
    exhausted: bool,
}

impl<E: Entity> KeysetCursor<E> {
    pub(crate) fn new(foreign_key: &'static str, parent_id: i64, page_size: u32) -> Self {
        Self {
            sql: format!(
                "SELECT * FROM {} WHERE {} = ? AND id > ? ORDER BY id LIMIT ?",
                E::TABLE,
                foreign_key
            ),
            parent_id,
            after: 0,
            page_size: page_size.max(1),
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    pub(crate) async fn next(&mut self, uow: &mut UnitOfWork) -> Result<Option<E>, DbError> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fill(uow).await?;
        }
        Ok(self.buffer.pop_front())
    }

    async fn fill(&mut self, uow: &mut UnitOfWork) -> Result<(), DbError> {
        let rows: Vec<E> = sqlx::query_as::<_, E>(&self.sql)
            .bind(self.parent_id)
            .bind(self.after)
            .bind(i64::from(self.page_size))
            .fetch_all(uow.conn().await?)
            .await?;

        if rows.len() < self.page_size as usize {
            self.exhausted = true;
        }
        if let Some(last) = rows.last() {
            self.after = last.id();
        }

        self.buffer.extend(rows);
        Ok(())
    }
}

/// Stream state: the borrowed unit of work plus one cursor.
struct Related<'a, E> {
    uow: &'a mut UnitOfWork,
    cursor: KeysetCursor<E>,
}

impl<'a, E: Entity> Related<'a, E> {
    async fn step(mut self) -> Result<Option<(E, Self)>, DbError> {
        let next = self.cursor.next(self.uow).await?;
        Ok(next.map(|row| (row, self)))
    }
}

/// Lazy, single-pass stream of related rows. Calling again starts over.
pub(crate) fn related<'a, E: Entity>(
    uow: &'a mut UnitOfWork,
    foreign_key: &'static str,
    parent_id: i64,
    page_size: u32,
) -> impl Stream<Item = Result<E, DbError>> + Send + 'a {
    let cursor = KeysetCursor::<E>::new(foreign_key, parent_id, page_size);
    stream::try_unfold(Related { uow, cursor }, Related::step)
}
