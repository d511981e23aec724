//! Profile service implementation

use tracing::{debug, info};
use uuid::Uuid;
use crate::database::ProfileRepository;
use crate::models::{AppRole, Profile, UpdateProfileRequest};
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::logging::log_admin_action;

/// Check the fields of a profile update
pub fn validate_profile_update(request: &UpdateProfileRequest) -> Result<()> {
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(KarmaHubError::InvalidInput("Name cannot be empty".to_string()));
        }
    }
    if let Some(year) = request.year {
        if !(1..=6).contains(&year) {
            return Err(KarmaHubError::InvalidInput("Year must be between 1 and 6".to_string()));
        }
    }
    if let Some(linkedin_url) = request.linkedin_url.as_deref().filter(|u| !u.is_empty()) {
        let parsed = url::Url::parse(linkedin_url)
            .map_err(|_| KarmaHubError::InvalidInput("LinkedIn URL is not a valid URL".to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(KarmaHubError::InvalidInput("LinkedIn URL must use http or https".to_string()));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct ProfileService {
    profiles: ProfileRepository,
}

impl ProfileService {
    pub fn new(profiles: ProfileRepository) -> Self {
        Self { profiles }
    }

    /// Get a profile by ID
    pub async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        self.profiles
            .find_by_id(id)
            .await?
            .ok_or(KarmaHubError::ProfileNotFound { profile_id: id })
    }

    /// Update the caller's own profile
    pub async fn update_me(&self, profile: &Profile, mut request: UpdateProfileRequest) -> Result<Profile> {
        validate_profile_update(&request)?;
        request.name = request.name.map(|n| n.trim().to_string());

        let updated = self.profiles.update(profile.id, request).await?;
        debug!(user_id = %profile.id, "Profile updated");
        Ok(updated)
    }

    /// List profiles for the admin view
    pub async fn list_profiles(&self, role: Option<AppRole>) -> Result<Vec<Profile>> {
        self.profiles.list(role).await
    }

    /// Change a user's role. Admins cannot demote themselves.
    pub async fn set_role(&self, admin: &Profile, id: Uuid, role: AppRole) -> Result<Profile> {
        if admin.id == id && role != AppRole::Admin {
            return Err(KarmaHubError::InvalidInput("You cannot remove your own admin role".to_string()));
        }

        let updated = self.profiles.set_role(id, role).await?;
        log_admin_action(admin.id, "set_role", Some(&id.to_string()), Some(role.as_str()));
        info!(admin_id = %admin.id, user_id = %id, role = %role, "Role changed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_validation() {
        assert!(validate_profile_update(&UpdateProfileRequest::default()).is_ok());

        let ok = UpdateProfileRequest {
            year: Some(3),
            linkedin_url: Some("https://www.linkedin.com/in/asha".to_string()),
            ..Default::default()
        };
        assert!(validate_profile_update(&ok).is_ok());

        let bad_year = UpdateProfileRequest { year: Some(7), ..Default::default() };
        assert!(validate_profile_update(&bad_year).is_err());

        let bad_url = UpdateProfileRequest {
            linkedin_url: Some("ftp://linkedin.com/in/asha".to_string()),
            ..Default::default()
        };
        assert!(validate_profile_update(&bad_url).is_err());

        let blank_name = UpdateProfileRequest { name: Some(" ".to_string()), ..Default::default() };
        assert!(validate_profile_update(&blank_name).is_err());
    }
}
