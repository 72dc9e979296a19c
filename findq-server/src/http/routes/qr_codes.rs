//! QR code endpoints
//!
//! Loading a code through any of these endpoints also makes sure its
//! artifact exists, so the returned `image_url` always resolves.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use findq_core::db::{QrCode, QrCodeRepo, UserRepo};
use findq_core::models::Description;
use futures::TryStreamExt;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::{RequestUnit, ValidId, ValidJson};
use crate::state::AppState;
use crate::views::QrCodeView;

/// Create QR code request
#[derive(Deserialize)]
pub struct CreateQrCodeRequest {
    #[serde(default)]
    pub description: String,
}

async fn code_view(state: &AppState, code: QrCode) -> Result<QrCodeView, ApiError> {
    state.ensure_artifact(code.id).await?;
    let image_url = state.artifact_url(code.id);
    let ping_url = state.artifacts().payload_for(code.id);
    Ok(QrCodeView::new(code, image_url, ping_url))
}

/// GET /users/{id}/qr-codes - the user's codes in creation order
async fn list_for_user(
    State(state): State<AppState>,
    RequestUnit(mut uow): RequestUnit,
    ValidId(user_id): ValidId,
) -> Result<Json<Vec<QrCodeView>>, ApiError> {
    UserRepo::new(&mut uow).get(user_id).await?;
    let codes: Vec<QrCode> = UserRepo::new(&mut uow)
        .qr_codes(user_id)
        .try_collect()
        .await?;
    uow.close();

    let mut views = Vec::with_capacity(codes.len());
    for code in codes {
        views.push(code_view(&state, code).await?);
    }
    Ok(Json(views))
}

/// POST /users/{id}/qr-codes - register a new location
async fn create_code(
    State(state): State<AppState>,
    RequestUnit(mut uow): RequestUnit,
    ValidId(user_id): ValidId,
    ValidJson(req): ValidJson<CreateQrCodeRequest>,
) -> Result<(StatusCode, Json<QrCodeView>), ApiError> {
    let description = Description::new(&req.description)?;

    UserRepo::new(&mut uow).get(user_id).await?;
    let mut codes = QrCodeRepo::new(&mut uow);
    let id = codes.create(user_id, &description).await?;
    let code = codes.get(id).await?;
    uow.close();

    Ok((StatusCode::CREATED, Json(code_view(&state, code).await?)))
}

/// GET /qr-codes/{id}
async fn get_code(
    State(state): State<AppState>,
    RequestUnit(mut uow): RequestUnit,
    ValidId(id): ValidId,
) -> Result<Json<QrCodeView>, ApiError> {
    let code = QrCodeRepo::new(&mut uow).get(id).await?;
    uow.close();

    Ok(Json(code_view(&state, code).await?))
}

/// GET /qr-codes/{id}/download - the artifact as a file download
async fn download_code(
    State(state): State<AppState>,
    RequestUnit(mut uow): RequestUnit,
    ValidId(id): ValidId,
) -> Result<impl IntoResponse, ApiError> {
    QrCodeRepo::new(&mut uow).get(id).await?;
    uow.close();

    let artifact = state.ensure_artifact(id).await?;
    let bytes = tokio::fs::read(&artifact.path)
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("failed to read {}: {}", artifact.path.display(), e),
        })?;

    let format = state.artifacts().format();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.artifacts().file_name(id)
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// QR code routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/qr-codes", get(list_for_user).post(create_code))
        .route("/qr-codes/{id}", get(get_code))
        .route("/qr-codes/{id}/download", get(download_code))
}
