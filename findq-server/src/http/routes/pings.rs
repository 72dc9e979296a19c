//! Ping endpoints
//!
//! `POST /p/{id}` is the URL printed inside every code: scanning it submits
//! a geotagged check-in, optionally with photos.

use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use findq_core::db::{NewPing, PingRepo, QrCode, QrCodePing, QrCodeRepo, UserRepo};
use findq_core::models::{Coordinates, Description};
use findq_core::{Attachment, UnitOfWork, ValidationError};
use futures::TryStreamExt;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::{RequestUnit, ValidId, ValidJson};
use crate::state::AppState;
use crate::views::{self, Created, PingView};

/// Photos arrive base64-encoded inside the JSON body.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// One uploaded photo
#[derive(Deserialize)]
pub struct AttachmentPayload {
    pub filename: String,
    pub data: String,
}

/// Create ping request
#[derive(Deserialize)]
pub struct CreatePingRequest {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

impl CreatePingRequest {
    /// Blank or missing descriptions are stored as empty text.
    fn description(&self) -> Result<String, ValidationError> {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(Description::new(text)?.into_string()),
            _ => Ok(String::new()),
        }
    }

    fn decode_attachments(&self) -> Result<Vec<Attachment>, ValidationError> {
        self.attachments
            .iter()
            .map(|a| {
                let bytes = STANDARD.decode(a.data.as_bytes()).map_err(|_| {
                    ValidationError::InvalidFormat {
                        field: "attachment data",
                        reason: "must be base64",
                    }
                })?;
                Attachment::new(a.filename.clone(), bytes)
            })
            .collect()
    }
}

/// POST /p/{id} - record a ping against a code
///
/// The creation runs as its own task, so a client that disconnects midway
/// cannot leave a half-written ping behind.
async fn create_ping(
    State(state): State<AppState>,
    RequestUnit(mut uow): RequestUnit,
    ValidId(qr_code_id): ValidId,
    ValidJson(req): ValidJson<CreatePingRequest>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let coordinates = Coordinates::new(req.lat, req.lon)?;
    let description = req.description()?;
    let attachments = req.decode_attachments()?;

    QrCodeRepo::new(&mut uow).get(qr_code_id).await?;

    let store = state.attachments().clone();
    let creation = tokio::spawn(async move {
        let new = NewPing {
            qr_code_id,
            coordinates,
            description: &description,
        };
        PingRepo::new(&mut uow)
            .create(new, &attachments, &store)
            .await
    });
    let id = creation.await.map_err(|e| ApiError::Internal {
        message: format!("ping creation task failed: {}", e),
    })??;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Static URLs of the ping's photos, in upload order.
///
/// An image row whose file has gone missing is skipped.
async fn image_urls(
    state: &AppState,
    uow: &mut UnitOfWork,
    ping_id: i64,
) -> Result<Vec<String>, ApiError> {
    let images: Vec<_> = PingRepo::new(uow).images(ping_id).try_collect().await?;

    let mut urls = Vec::with_capacity(images.len());
    for image in images {
        match state.attachments().locate(image.id).await? {
            Some(path) => urls.extend(state.attachment_url(&path)),
            None => tracing::warn!(image_id = image.id, ping_id, "image file missing"),
        }
    }
    Ok(urls)
}

/// GET /pings/{id}
async fn get_ping(
    State(state): State<AppState>,
    RequestUnit(mut uow): RequestUnit,
    ValidId(id): ValidId,
) -> Result<Json<PingView>, ApiError> {
    let ping = PingRepo::new(&mut uow).get(id).await?;
    let urls = image_urls(&state, &mut uow, ping.id).await?;
    let title = views::ping_title(&ping);

    Ok(Json(PingView::new(ping, title, urls)))
}

/// GET /users/{id}/pings - every ping on the user's codes, newest first
async fn list_for_user(
    State(state): State<AppState>,
    RequestUnit(mut uow): RequestUnit,
    ValidId(user_id): ValidId,
) -> Result<Json<Vec<PingView>>, ApiError> {
    UserRepo::new(&mut uow).get(user_id).await?;

    let codes: HashMap<i64, String> = UserRepo::new(&mut uow)
        .qr_codes(user_id)
        .map_ok(|code: QrCode| (code.id, code.description))
        .try_collect()
        .await?;

    let mut pings: Vec<QrCodePing> = UserRepo::new(&mut uow)
        .qr_code_pings(user_id)
        .try_collect()
        .await?;
    pings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut out = Vec::with_capacity(pings.len());
    for ping in pings {
        let label = codes.get(&ping.qr_code_id).map(String::as_str).unwrap_or_default();
        let title = views::listing_title(label, &ping);
        let urls = image_urls(&state, &mut uow, ping.id).await?;
        out.push(PingView::new(ping, title, urls));
    }
    Ok(Json(out))
}

/// GET /users/{id}/pings/latest
async fn latest_for_user(
    State(state): State<AppState>,
    RequestUnit(mut uow): RequestUnit,
    ValidId(user_id): ValidId,
) -> Result<Json<PingView>, ApiError> {
    UserRepo::new(&mut uow).get(user_id).await?;

    let ping = PingRepo::new(&mut uow)
        .latest_for_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "ping",
            id: format!("latest for user {}", user_id),
        })?;

    let urls = image_urls(&state, &mut uow, ping.id).await?;
    let title = views::ping_title(&ping);
    Ok(Json(PingView::new(ping, title, urls)))
}

/// Ping routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/p/{id}",
            post(create_ping).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/pings/{id}", get(get_ping))
        .route("/users/{id}/pings", get(list_for_user))
        .route("/users/{id}/pings/latest", get(latest_for_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(description: Option<&str>, data: &str) -> CreatePingRequest {
        CreatePingRequest {
            lat: 40.0,
            lon: -73.0,
            description: description.map(str::to_owned),
            attachments: vec![AttachmentPayload {
                filename: "porch.jpg".into(),
                data: data.into(),
            }],
        }
    }

    #[test]
    fn blank_description_becomes_empty() {
        assert_eq!(request(None, "").description().unwrap(), "");
        assert_eq!(request(Some("   "), "").description().unwrap(), "");
        assert_eq!(
            request(Some(" left package "), "").description().unwrap(),
            "left package"
        );
    }

    #[test]
    fn overlong_description_rejected() {
        let long = "x".repeat(501);
        let err = request(Some(&long), "").description().unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 500, .. }));
    }

    #[test]
    fn attachments_are_decoded() {
        let decoded = request(None, &STANDARD.encode(b"jpeg bytes"))
            .decode_attachments()
            .unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].bytes(), b"jpeg bytes");
        assert_eq!(decoded[0].extension(), "jpg");
    }

    #[test]
    fn bad_base64_rejected() {
        let err = request(None, "not base64!!").decode_attachments().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }
}
