//! Unit of work - the request-scoped storage handle
//!
//! A unit of work wraps one pooled connection. The connection is acquired
//! on first use and reused for every statement after that. Dropping the
//! unit hands the connection back to the pool, so release happens on every
//! exit path, including `?` early returns and errors.

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};

use crate::error::DbError;

pub struct UnitOfWork {
    pool: SqlitePool,
    conn: Option<PoolConnection<Sqlite>>,
}

impl UnitOfWork {
    /// Start a unit of work. No connection is taken until the first query.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, conn: None }
    }

    /// Whether a connection has been acquired yet.
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// The unit's connection, acquiring it from the pool on first call.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] when no connection can be acquired.
    pub async fn conn(&mut self) -> Result<&mut SqliteConnection, DbError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                let conn = self.pool.acquire().await.map_err(DbError::Connection)?;
                tracing::trace!("unit of work acquired connection");
                conn
            }
        };

        Ok(&mut **self.conn.insert(conn))
    }

    /// End the unit explicitly. Equivalent to dropping it.
    pub fn close(self) {}
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.conn.take().is_some() {
            tracing::trace!("unit of work released connection");
        }
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("open", &self.is_open())
            .finish()
    }
}
