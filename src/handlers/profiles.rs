//! Profile endpoints, including the caller's own collections

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use crate::middleware::CurrentUser;
use crate::models::{
    Attendance, EventRegistration, GeneratedPost, Listing, Profile, Transaction, UpdateProfileRequest,
};
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn get_me(CurrentUser(profile): CurrentUser) -> Json<Profile> {
    Json(profile)
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    let updated = state.services.profile_service.update_me(&profile, request).await?;
    Ok(Json(updated))
}

pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>> {
    Ok(Json(state.services.profile_service.get_profile(id).await?))
}

pub async fn my_listings(State(state): State<AppState>, CurrentUser(profile): CurrentUser) -> Result<Json<Vec<Listing>>> {
    Ok(Json(state.services.marketplace_service.my_listings(&profile).await?))
}

pub async fn my_purchases(State(state): State<AppState>, CurrentUser(profile): CurrentUser) -> Result<Json<Vec<Listing>>> {
    Ok(Json(state.services.marketplace_service.my_purchases(&profile).await?))
}

pub async fn my_transactions(State(state): State<AppState>, CurrentUser(profile): CurrentUser) -> Result<Json<Vec<Transaction>>> {
    Ok(Json(state.services.marketplace_service.my_transactions(&profile).await?))
}

pub async fn my_attendances(State(state): State<AppState>, CurrentUser(profile): CurrentUser) -> Result<Json<Vec<Attendance>>> {
    Ok(Json(state.services.attendance_service.my_attendances(&profile).await?))
}

pub async fn my_registrations(State(state): State<AppState>, CurrentUser(profile): CurrentUser) -> Result<Json<Vec<EventRegistration>>> {
    Ok(Json(state.services.registration_service.my_registrations(&profile).await?))
}

pub async fn my_posts(State(state): State<AppState>, CurrentUser(profile): CurrentUser) -> Result<Json<Vec<GeneratedPost>>> {
    Ok(Json(state.services.post_service.my_posts(&profile).await?))
}
