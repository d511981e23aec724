//! Marketplace endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use crate::handlers::multipart::MultipartForm;
use crate::middleware::CurrentUser;
use crate::models::{CreateListingRequest, Listing, ListingFilter, Transaction, UpdateListingRequest};
use crate::state::AppState;
use crate::utils::errors::{KarmaHubError, Result};

/// Result of a confirmed payment
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub transaction: Transaction,
    pub listing: Listing,
}

pub async fn browse(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(filter): Query<ListingFilter>,
) -> Result<Json<Vec<Listing>>> {
    Ok(Json(state.services.marketplace_service.browse(filter).await?))
}

pub async fn create_listing(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<Listing>)> {
    let listing = state.services.marketplace_service.create_listing(&profile, request).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn get_listing(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Listing>> {
    Ok(Json(state.services.marketplace_service.get_listing(id).await?))
}

pub async fn update_listing(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<Listing>> {
    Ok(Json(state.services.marketplace_service.update_listing(&profile, id, request).await?))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.marketplace_service.delete_listing(&profile, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Multipart upload with a `file` field
pub async fn attach_image(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Listing>> {
    let mut form = MultipartForm::read(multipart).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| KarmaHubError::InvalidInput("An image file is required".to_string()))?;

    Ok(Json(state.services.marketplace_service.attach_listing_image(&profile, id, file).await?))
}

pub async fn start_purchase(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let transaction = state.services.marketplace_service.start_purchase(&profile, id).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>> {
    let (transaction, listing) = state.services.marketplace_service.confirm_payment(&profile, id).await?;
    Ok(Json(PaymentResponse { transaction, listing }))
}

pub async fn cancel_payment(
    State(state): State<AppState>,
    CurrentUser(profile): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Transaction>> {
    Ok(Json(state.services.marketplace_service.cancel_payment(&profile, id).await?))
}
