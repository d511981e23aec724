//! Event registration service
//!
//! A registration is a pre-event sign-up backed by an uploaded proof that an
//! admin approves or rejects.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use crate::database::{EventRepository, RegistrationRepository};
use crate::models::{EventRegistration, Profile, RegistrationStatus, RegistrationWithProfile};
use crate::services::storage::{StorageService, UploadedFile, REGISTRATION_BUCKET};
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::logging::{log_admin_action, log_user_action};

pub const MAX_NOTE_CHARS: usize = 1000;

#[derive(Clone)]
pub struct RegistrationService {
    events: EventRepository,
    registrations: RegistrationRepository,
    storage: StorageService,
}

impl RegistrationService {
    pub fn new(events: EventRepository, registrations: RegistrationRepository, storage: StorageService) -> Self {
        Self { events, registrations, storage }
    }

    /// Register the caller for an event
    pub async fn register(&self, user: &Profile, event_id: Uuid, proof: Option<UploadedFile>, note: Option<String>) -> Result<EventRegistration> {
        let proof = proof
            .ok_or_else(|| KarmaHubError::InvalidInput("Please upload proof of registration".to_string()))?;
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if note.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTE_CHARS) {
            return Err(KarmaHubError::InvalidInput(format!("Note must be at most {} characters", MAX_NOTE_CHARS)));
        }

        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(KarmaHubError::EventNotFound { event_id })?;
        if event.has_ended(Utc::now()) {
            return Err(KarmaHubError::InvalidInput("Registration is closed for this event".to_string()));
        }

        let existing = self.registrations.find_for_user(event_id, user.id).await?;
        if let Some(existing) = &existing {
            if existing.status != RegistrationStatus::Rejected {
                return Err(KarmaHubError::Conflict("You have already registered for this event".to_string()));
            }
        }

        let proof_url = self
            .storage
            .store(REGISTRATION_BUCKET, &event_id.to_string(), &user.id.to_string(), &proof)
            .await?;

        let registration = match existing {
            Some(existing) => self
                .registrations
                .resubmit(existing.id, &proof_url, note)
                .await?
                .ok_or_else(|| KarmaHubError::Conflict("You have already registered for this event".to_string()))?,
            None => self.registrations.create(event_id, user.id, &proof_url, note).await?,
        };
        log_user_action(user.id, "register_event", Some(&event_id.to_string()));
        Ok(registration)
    }

    pub async fn my_registrations(&self, user: &Profile) -> Result<Vec<EventRegistration>> {
        self.registrations.list_for_user(user.id).await
    }

    pub async fn event_registrations(&self, event_id: Uuid) -> Result<Vec<RegistrationWithProfile>> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(KarmaHubError::EventNotFound { event_id });
        }
        self.registrations.list_for_event_with_profiles(event_id).await
    }

    /// Approve or reject a registration
    pub async fn review(&self, admin: &Profile, id: Uuid, status: RegistrationStatus) -> Result<EventRegistration> {
        if status == RegistrationStatus::Pending {
            return Err(KarmaHubError::InvalidInput("Review must approve or reject".to_string()));
        }

        let registration = self.registrations.review(id, status, admin.id).await?;
        log_admin_action(admin.id, "review_registration", Some(&id.to_string()), Some(status.as_str()));
        info!(registration_id = %id, status = status.as_str(), "Registration reviewed");
        Ok(registration)
    }
}
