//! Event, check-in and registration endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::handlers::multipart::MultipartForm;
use crate::middleware::CurrentUser;
use crate::models::{Attendance, Event, EventRegistration, EventScope};
use crate::services::CheckInSubmission;
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub scope: EventScope,
}

/// An event with the caller's attendance
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub is_live: bool,
    pub my_attendance: Option<Attendance>,
}

pub async fn list_events(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.services.event_service.list_events(query.scope).await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetail>> {
    let event = state.services.event_service.get_event(id).await?;
    let my_attendance = state.services.attendance_service.my_attendance(&profile, id).await?;

    Ok(Json(EventDetail {
        is_live: event.is_live(Utc::now()),
        event,
        my_attendance,
    }))
}

/// Multipart fields: `selfie`, `certificate`, `latitude`, `longitude`
pub async fn check_in(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Attendance>> {
    let mut form = MultipartForm::read(multipart).await?;
    let submission = CheckInSubmission {
        position: form.position()?,
        selfie: form.take_file("selfie"),
        certificate: form.take_file("certificate"),
    };

    Ok(Json(state.services.attendance_service.check_in(&profile, id, submission).await?))
}

pub async fn check_out(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Attendance>> {
    Ok(Json(state.services.attendance_service.check_out(&profile, id).await?))
}

/// Multipart fields: `proof`, `note`
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<EventRegistration>)> {
    let mut form = MultipartForm::read(multipart).await?;
    let note = form.text("note").map(str::to_string);
    let proof = form.take_file("proof");

    let registration = state
        .services
        .registration_service
        .register(&profile, id, proof, note)
        .await?;
    Ok((StatusCode::CREATED, Json(registration)))
}
