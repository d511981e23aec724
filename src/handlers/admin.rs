//! Admin endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use crate::middleware::AdminUser;
use crate::models::{
    AppRole, Attendance, AttendanceStatus, AttendanceWithProfile, CreateEventRequest, Event,
    EventRegistration, Listing, ListingCategory, ListingStatus, Profile, RegistrationStatus,
    RegistrationWithProfile, UpdateEventRequest,
};
use crate::services::DashboardStats;
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<AppRole>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingListQuery {
    pub status: Option<ListingStatus>,
    pub category: Option<ListingCategory>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: AppRole,
}

#[derive(Debug, Deserialize)]
pub struct SetAttendanceStatusRequest {
    pub status: AttendanceStatus,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRegistrationRequest {
    pub status: RegistrationStatus,
}

pub async fn stats(State(state): State<AppState>, AdminUser(_): AdminUser) -> Result<Json<DashboardStats>> {
    Ok(Json(state.services.dashboard_service.stats().await?))
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<Profile>>> {
    Ok(Json(state.services.profile_service.list_profiles(query.role).await?))
}

pub async fn set_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<Profile>> {
    Ok(Json(state.services.profile_service.set_role(&admin, id, request.role).await?))
}

pub async fn list_listings(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(query): Query<ListingListQuery>,
) -> Result<Json<Vec<Listing>>> {
    let listings = state
        .services
        .marketplace_service
        .list_all_listings(query.status, query.category)
        .await?;
    Ok(Json(listings))
}

pub async fn create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.services.event_service.create_event(&admin, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    Ok(Json(state.services.event_service.update_event(&admin, id, request).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.event_service.delete_event(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn event_attendance(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttendanceWithProfile>>> {
    Ok(Json(state.services.attendance_service.event_attendance(id).await?))
}

/// CSV download of an event's attendance sheet
pub async fn export_attendance(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let csv = state.services.attendance_service.export_csv(id).await?;
    let ascii_name: String = csv
        .filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_name,
        urlencoding::encode(&csv.filename)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv.body,
    ))
}

pub async fn set_attendance_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SetAttendanceStatusRequest>,
) -> Result<Json<Attendance>> {
    Ok(Json(state.services.attendance_service.set_status(&admin, id, request.status).await?))
}

pub async fn event_registrations(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RegistrationWithProfile>>> {
    Ok(Json(state.services.registration_service.event_registrations(id).await?))
}

pub async fn review_registration(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRegistrationRequest>,
) -> Result<Json<EventRegistration>> {
    Ok(Json(state.services.registration_service.review(&admin, id, request.status).await?))
}
