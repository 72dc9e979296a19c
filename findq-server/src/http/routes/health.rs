//! Health check endpoint
//!
//! Reports whether the store answers a trivial query. A store that cannot
//! be reached turns the check into a 503 so load balancers stop routing.

use axum::{http::StatusCode, routing::get, Json, Router};
use findq_core::{DbError, UnitOfWork};
use serde::Serialize;

use crate::http::extractors::RequestUnit;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

async fn check_store(uow: &mut UnitOfWork) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(uow.conn().await?)
        .await?;
    Ok(())
}

/// GET /health
async fn health(RequestUnit(mut uow): RequestUnit) -> (StatusCode, Json<HealthResponse>) {
    let (status, body_status, database) = match check_store(&mut uow).await {
        Ok(()) => (StatusCode::OK, "ok", "ok"),
        Err(err) => {
            tracing::warn!(error = %err, "health check: store unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: body_status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Health routes
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
