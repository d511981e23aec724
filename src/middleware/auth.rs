//! Authentication extractors
//!
//! Requests authenticate with `Authorization: Bearer <token>`. The profile is
//! loaded from the database on every request so role changes apply at once.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::{debug, warn};
use crate::models::Profile;
use crate::services::auth::require_admin;
use crate::state::AppState;
use crate::utils::errors::KarmaHubError;

/// Extract the bearer token from request headers
pub fn bearer_token(parts: &Parts) -> Result<&str, KarmaHubError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| KarmaHubError::Authentication("Missing authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| KarmaHubError::Authentication("Expected a bearer token".to_string()))
}

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Profile);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = KarmaHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let profile = state.services.auth_service.authenticate(token).await?;
        debug!(user_id = %profile.id, role = %profile.role, "Request authenticated");
        Ok(CurrentUser(profile))
    }
}

/// An authenticated caller holding the ADMIN role
#[derive(Debug, Clone)]
pub struct AdminUser(pub Profile);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = KarmaHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(profile) = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(&profile).map_err(|e| {
            warn!(user_id = %profile.id, path = %parts.uri.path(), "Unauthorized admin access attempt");
            e
        })?;
        Ok(AdminUser(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/me");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))).unwrap(), "abc.def");
        assert!(bearer_token(&parts_with(None)).is_err());
        assert!(bearer_token(&parts_with(Some("Basic dXNlcg=="))).is_err());
        assert!(bearer_token(&parts_with(Some("Bearer  "))).is_err());
    }
}
