//! Authentication service implementation
//!
//! This service handles account sign-up and sign-in, argon2 password hashing,
//! JWT session tokens and the admin authorization check.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::config::AuthConfig;
use crate::database::{AccountRepository, NewAccount, ProfileRepository};
use crate::models::{AppRole, Profile};
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::helpers::{is_valid_email, normalize_email};

pub const MIN_PASSWORD_LENGTH: usize = 5;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// JWT claims carried by every session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: AppRole,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Issued session
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub profile: Profile,
}

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| KarmaHubError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// `hash_password` on the blocking pool
pub async fn hash_password_async(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| KarmaHubError::PasswordHash(format!("hashing task failed: {}", e)))?
}

/// `verify_password` on the blocking pool
pub async fn verify_password_async(password: String, stored_hash: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await {
        Ok(valid) => valid,
        Err(e) => {
            warn!(error = %e, "Password verification task failed");
            false
        }
    }
}

/// Verify a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash could not be parsed");
            false
        }
    }
}

/// Check sign-up input, returning the normalized email
pub fn validate_sign_up(request: &SignUpRequest) -> Result<String> {
    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        return Err(KarmaHubError::InvalidInput("Please enter a valid email address".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(KarmaHubError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if request.name.trim().is_empty() {
        return Err(KarmaHubError::InvalidInput("Name is required".to_string()));
    }
    Ok(email)
}

/// Only admins pass
pub fn require_admin(profile: &Profile) -> Result<()> {
    if profile.is_admin() {
        Ok(())
    } else {
        Err(KarmaHubError::PermissionDenied("Admin access required".to_string()))
    }
}

/// Authentication service for accounts and sessions
#[derive(Clone)]
pub struct AuthService {
    accounts: AccountRepository,
    profiles: ProfileRepository,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(accounts: AccountRepository, profiles: ProfileRepository, config: AuthConfig) -> Self {
        Self { accounts, profiles, config }
    }

    /// Register a new student account
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Session> {
        let email = validate_sign_up(&request)?;
        debug!(email = %email, "Signing up");

        let new = NewAccount {
            email,
            password_hash: hash_password_async(request.password.clone()).await?,
            email_confirmed: !self.config.require_email_confirmation,
            name: request.name.trim().to_string(),
            role: AppRole::Student,
        };
        let (account, profile) = self.accounts.create_with_profile(new).await?;
        info!(user_id = %account.id, "Account created");

        self.issue_session(profile)
    }

    /// Authenticate with email and password
    pub async fn sign_in(&self, request: SignInRequest) -> Result<Session> {
        let email = normalize_email(&request.email);

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| KarmaHubError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password_async(request.password, account.password_hash.clone()).await {
            warn!(user_id = %account.id, "Sign-in rejected: wrong password");
            return Err(KarmaHubError::Authentication(INVALID_CREDENTIALS.to_string()));
        }
        if self.config.require_email_confirmation && !account.email_confirmed {
            return Err(KarmaHubError::Authentication("Email address has not been confirmed".to_string()));
        }

        let profile = self
            .profiles
            .find_by_id(account.id)
            .await?
            .ok_or(KarmaHubError::ProfileNotFound { profile_id: account.id })?;

        self.accounts.touch_sign_in(account.id).await?;
        info!(user_id = %account.id, "Signed in");

        self.issue_session(profile)
    }

    /// Sign a session token for a profile
    pub fn issue_token(&self, profile: &Profile) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: profile.id,
            email: profile.email.clone(),
            role: profile.role,
            iat: now,
            exp: now + self.config.token_ttl_seconds as i64,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Validate a session token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Resolve the profile behind a token; role changes apply immediately
    pub async fn authenticate(&self, token: &str) -> Result<Profile> {
        let claims = self.verify_token(token)?;
        self.profiles
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| KarmaHubError::Authentication("Account no longer exists".to_string()))
    }

    fn issue_session(&self, profile: Profile) -> Result<Session> {
        Ok(Session {
            access_token: self.issue_token(&profile)?,
            token_type: "bearer",
            expires_in: self.config.token_ttl_seconds,
            profile,
        })
    }
}
