//! Event registration repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::event::{EventRegistration, RegistrationStatus, RegistrationWithProfile};
use crate::utils::errors::KarmaHubError;
use super::conflict_on_unique;

#[derive(Clone, Debug)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending registration
    pub async fn create(&self, event_id: Uuid, user_id: Uuid, proof_url: &str, note: Option<String>) -> Result<EventRegistration, KarmaHubError> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            INSERT INTO event_registrations (id, event_id, user_id, proof_url, note, status, created_at)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6)
            RETURNING id, event_id, user_id, proof_url, note, status, reviewed_by_id, reviewed_at, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .bind(proof_url)
        .bind(note)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "You have already registered for this event"))?;

        Ok(registration)
    }

    /// Replace the proof of a rejected registration and send it back to review
    pub async fn resubmit(&self, id: Uuid, proof_url: &str, note: Option<String>) -> Result<Option<EventRegistration>, KarmaHubError> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            UPDATE event_registrations
            SET proof_url = $2, note = $3, status = 'pending', reviewed_by_id = NULL, reviewed_at = NULL
            WHERE id = $1 AND status = 'rejected'
            RETURNING id, event_id, user_id, proof_url, note, status, reviewed_by_id, reviewed_at, created_at
            "#
        )
        .bind(id)
        .bind(proof_url)
        .bind(note)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventRegistration>, KarmaHubError> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            "SELECT id, event_id, user_id, proof_url, note, status, reviewed_by_id, reviewed_at, created_at FROM event_registrations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find the registration of a user for an event
    pub async fn find_for_user(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<EventRegistration>, KarmaHubError> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            "SELECT id, event_id, user_id, proof_url, note, status, reviewed_by_id, reviewed_at, created_at FROM event_registrations WHERE event_id = $1 AND user_id = $2"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Record a review decision
    pub async fn review(&self, id: Uuid, status: RegistrationStatus, reviewer_id: Uuid) -> Result<EventRegistration, KarmaHubError> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            UPDATE event_registrations
            SET status = $2, reviewed_by_id = $3, reviewed_at = $4
            WHERE id = $1
            RETURNING id, event_id, user_id, proof_url, note, status, reviewed_by_id, reviewed_at, created_at
            "#
        )
        .bind(id)
        .bind(status)
        .bind(reviewer_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        registration.ok_or(KarmaHubError::NotFound { kind: "Registration", id })
    }

    /// Registrations for an event with the registrant's name and email, newest first
    pub async fn list_for_event_with_profiles(&self, event_id: Uuid) -> Result<Vec<RegistrationWithProfile>, KarmaHubError> {
        let rows = sqlx::query_as::<_, RegistrationWithProfile>(
            r#"
            SELECT r.id, r.event_id, r.user_id, r.proof_url, r.note, r.status, r.reviewed_by_id,
                   r.reviewed_at, r.created_at, p.name, p.email
            FROM event_registrations r
            JOIN profiles p ON p.id = r.user_id
            WHERE r.event_id = $1
            ORDER BY r.created_at DESC
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Registrations of a user, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<EventRegistration>, KarmaHubError> {
        let rows = sqlx::query_as::<_, EventRegistration>(
            "SELECT id, event_id, user_id, proof_url, note, status, reviewed_by_id, reviewed_at, created_at FROM event_registrations WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
