//! Account repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::profile::{Account, AppRole, Profile};
use crate::utils::errors::KarmaHubError;
use super::conflict_on_unique;

#[derive(Clone, Debug)]
pub struct AccountRepository {
    pool: PgPool,
}

/// Fields needed to create an account together with its profile
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub name: String,
    pub role: AppRole,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an account and its profile atomically
    pub async fn create_with_profile(&self, new: NewAccount) -> Result<(Account, Profile), KarmaHubError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, email_confirmed, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, email_confirmed, created_at, last_sign_in_at
            "#
        )
        .bind(id)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.email_confirmed)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "An account with this email already exists"))?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, name, email, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, name, email, role, college, branch, year, bio, linkedin_url, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.role)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((account, profile))
    }

    /// Find account by email (expects a normalized address)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, KarmaHubError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, email_confirmed, created_at, last_sign_in_at FROM accounts WHERE email = $1"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Find account by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, KarmaHubError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, email_confirmed, created_at, last_sign_in_at FROM accounts WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Replace the password hash and confirm the account
    pub async fn reset_password(&self, id: Uuid, password_hash: &str) -> Result<(), KarmaHubError> {
        sqlx::query("UPDATE accounts SET password_hash = $2, email_confirmed = TRUE WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mark the email as confirmed; returns false when the account does not exist
    pub async fn confirm_email(&self, id: Uuid) -> Result<bool, KarmaHubError> {
        let result = sqlx::query("UPDATE accounts SET email_confirmed = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record a successful sign-in
    pub async fn touch_sign_in(&self, id: Uuid) -> Result<(), KarmaHubError> {
        sqlx::query("UPDATE accounts SET last_sign_in_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
