//! Attendance repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::event::{Attendance, AttendanceStatus, AttendanceWithProfile, CheckInRequest};
use crate::utils::errors::KarmaHubError;

#[derive(Clone, Debug)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a check-in, replacing any earlier one for the same event and user.
    ///
    /// A repeated check-in clears the check-out time and sends the row back to review.
    pub async fn upsert_check_in(&self, request: CheckInRequest, at: DateTime<Utc>) -> Result<Attendance, KarmaHubError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO attendances (id, event_id, user_id, check_in_time, check_out_time, selfie_url, certificate_url, status, created_at)
            VALUES ($1, $2, $3, $4, NULL, $5, $6, 'pending', $4)
            ON CONFLICT (event_id, user_id) DO UPDATE
            SET check_in_time = EXCLUDED.check_in_time,
                check_out_time = NULL,
                selfie_url = EXCLUDED.selfie_url,
                certificate_url = EXCLUDED.certificate_url,
                status = 'pending'
            RETURNING id, event_id, user_id, check_in_time, check_out_time, selfie_url, certificate_url, status, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(request.event_id)
        .bind(request.user_id)
        .bind(at)
        .bind(request.selfie_url)
        .bind(request.certificate_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(attendance)
    }

    /// Find attendance by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Attendance>, KarmaHubError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            "SELECT id, event_id, user_id, check_in_time, check_out_time, selfie_url, certificate_url, status, created_at FROM attendances WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendance)
    }

    /// Find the attendance of a user at an event
    pub async fn find_for_user(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<Attendance>, KarmaHubError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            "SELECT id, event_id, user_id, check_in_time, check_out_time, selfie_url, certificate_url, status, created_at FROM attendances WHERE event_id = $1 AND user_id = $2"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendance)
    }

    /// Set the check-out time if the row is checked in and not yet checked out
    pub async fn set_check_out(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Attendance>, KarmaHubError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            r#"
            UPDATE attendances
            SET check_out_time = $2
            WHERE id = $1 AND check_in_time IS NOT NULL AND check_out_time IS NULL
            RETURNING id, event_id, user_id, check_in_time, check_out_time, selfie_url, certificate_url, status, created_at
            "#
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendance)
    }

    /// Change the review status
    pub async fn set_status(&self, id: Uuid, status: AttendanceStatus) -> Result<Attendance, KarmaHubError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            r#"
            UPDATE attendances
            SET status = $2
            WHERE id = $1
            RETURNING id, event_id, user_id, check_in_time, check_out_time, selfie_url, certificate_url, status, created_at
            "#
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        attendance.ok_or(KarmaHubError::NotFound { kind: "Attendance", id })
    }

    /// Attendances at an event with attendee name and email, latest check-in first
    pub async fn list_for_event_with_profiles(&self, event_id: Uuid) -> Result<Vec<AttendanceWithProfile>, KarmaHubError> {
        let rows = sqlx::query_as::<_, AttendanceWithProfile>(
            r#"
            SELECT a.id, a.event_id, a.user_id, a.check_in_time, a.check_out_time, a.selfie_url,
                   a.certificate_url, a.status, a.created_at, p.name, p.email
            FROM attendances a
            JOIN profiles p ON p.id = a.user_id
            WHERE a.event_id = $1
            ORDER BY a.check_in_time DESC NULLS LAST
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Attendances of a user, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Attendance>, KarmaHubError> {
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT id, event_id, user_id, check_in_time, check_out_time, selfie_url, certificate_url, status, created_at FROM attendances WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
