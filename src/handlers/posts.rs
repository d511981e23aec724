//! LinkedIn post and template endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use crate::middleware::CurrentUser;
use crate::models::{CreateTemplateRequest, GeneratePostRequest, GeneratedPost, PostTemplate};
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn generate(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Json(request): Json<GeneratePostRequest>,
) -> Result<(StatusCode, Json<GeneratedPost>)> {
    let post = state.services.post_service.generate(&profile, request).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.post_service.delete_post(&profile, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_templates(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
) -> Result<Json<Vec<PostTemplate>>> {
    Ok(Json(state.services.post_service.list_templates(&profile).await?))
}

pub async fn create_template(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<PostTemplate>)> {
    let template = state.services.post_service.create_template(&profile, request).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn delete_template(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.post_service.delete_template(&profile, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
