//! Profile repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::profile::{AppRole, Profile, UpsertProfileRequest, UpdateProfileRequest};
use crate::utils::errors::KarmaHubError;

#[derive(Clone, Debug)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find profile by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, KarmaHubError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, name, email, role, college, branch, year, bio, linkedin_url, created_at, updated_at FROM profiles WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Insert a profile or replace every field of an existing one
    pub async fn upsert(&self, request: UpsertProfileRequest) -> Result<Profile, KarmaHubError> {
        let now = Utc::now();
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, name, email, role, college, branch, year, bio, linkedin_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                role = EXCLUDED.role,
                college = EXCLUDED.college,
                branch = EXCLUDED.branch,
                year = EXCLUDED.year,
                bio = EXCLUDED.bio,
                linkedin_url = EXCLUDED.linkedin_url,
                updated_at = EXCLUDED.updated_at
            RETURNING id, name, email, role, college, branch, year, bio, linkedin_url, created_at, updated_at
            "#
        )
        .bind(request.id)
        .bind(request.name)
        .bind(request.email)
        .bind(request.role)
        .bind(request.college)
        .bind(request.branch)
        .bind(request.year)
        .bind(request.bio)
        .bind(request.linkedin_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Update profile fields that are present in the request
    pub async fn update(&self, id: Uuid, request: UpdateProfileRequest) -> Result<Profile, KarmaHubError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET name = COALESCE($2, name),
                college = COALESCE($3, college),
                branch = COALESCE($4, branch),
                year = COALESCE($5, year),
                bio = COALESCE($6, bio),
                linkedin_url = COALESCE($7, linkedin_url),
                updated_at = $8
            WHERE id = $1
            RETURNING id, name, email, role, college, branch, year, bio, linkedin_url, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.name)
        .bind(request.college)
        .bind(request.branch)
        .bind(request.year)
        .bind(request.bio)
        .bind(request.linkedin_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or(KarmaHubError::ProfileNotFound { profile_id: id })
    }

    /// Change a profile's role
    pub async fn set_role(&self, id: Uuid, role: AppRole) -> Result<Profile, KarmaHubError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET role = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, email, role, college, branch, year, bio, linkedin_url, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(role)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or(KarmaHubError::ProfileNotFound { profile_id: id })
    }

    /// List profiles, newest first, optionally filtered by role
    pub async fn list(&self, role: Option<AppRole>) -> Result<Vec<Profile>, KarmaHubError> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, name, email, role, college, branch, year, bio, linkedin_url, created_at, updated_at
            FROM profiles
            WHERE ($1::app_role IS NULL OR role = $1)
            ORDER BY created_at DESC
            "#
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Count total profiles
    pub async fn count(&self) -> Result<i64, KarmaHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
