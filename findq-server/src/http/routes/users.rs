//! User endpoints

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use findq_core::db::UserRepo;
use findq_core::models::Username;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::{RequestUnit, ValidId, ValidJson};
use crate::state::AppState;
use crate::views::{Created, UserView};

/// Create user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// POST /users - register an account
async fn create_user(
    RequestUnit(mut uow): RequestUnit,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let username = Username::new(&req.username)?;
    let id = UserRepo::new(&mut uow).create(&username).await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// GET /users/{id}
async fn get_user(
    RequestUnit(mut uow): RequestUnit,
    ValidId(id): ValidId,
) -> Result<Json<UserView>, ApiError> {
    let user = UserRepo::new(&mut uow).get(id).await?;
    Ok(Json(UserView::from(user)))
}

/// User routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
}
