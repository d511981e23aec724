//! Sign-up and sign-in endpoints

use axum::{extract::State, http::StatusCode, Json};
use crate::services::{Session, SignInRequest, SignUpRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Session>)> {
    let session = state.services.auth_service.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<Session>> {
    let session = state.services.auth_service.sign_in(request).await?;
    Ok(Json(session))
}
