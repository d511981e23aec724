//! Error handling for Campus Karma Hub
//!
//! This module defines the main error types used throughout the application
//! and maps them onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Main error type for the Karma Hub application
#[derive(Error, Debug)]
pub enum KarmaHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("AI gateway error: {0}")]
    Ai(#[from] AiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Profile not found: {profile_id}")]
    ProfileNotFound { profile_id: uuid::Uuid },

    #[error("Listing not found: {listing_id}")]
    ListingNotFound { listing_id: uuid::Uuid },

    #[error("Transaction not found: {transaction_id}")]
    TransactionNotFound { transaction_id: uuid::Uuid },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: uuid::Uuid },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: uuid::Uuid },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// AI gateway specific errors
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI credits depleted. Please add credits to your workspace.")]
    CreditsDepleted,

    #[error("Failed to generate post (status {status})")]
    RequestFailed { status: u16 },

    #[error("No content generated")]
    EmptyResponse,

    #[error("AI gateway is not configured")]
    NotConfigured,
}

/// Result type alias for Karma Hub operations
pub type Result<T> = std::result::Result<T, KarmaHubError>;

impl KarmaHubError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            KarmaHubError::Database(_) => false,
            KarmaHubError::Migration(_) => false,
            KarmaHubError::Ai(AiError::RateLimited) => true,
            KarmaHubError::Ai(AiError::RequestFailed { .. }) => true,
            KarmaHubError::Ai(_) => false,
            KarmaHubError::Config(_) => false,
            KarmaHubError::PermissionDenied(_) => false,
            KarmaHubError::ProfileNotFound { .. } => false,
            KarmaHubError::ListingNotFound { .. } => false,
            KarmaHubError::TransactionNotFound { .. } => false,
            KarmaHubError::EventNotFound { .. } => false,
            KarmaHubError::NotFound { .. } => false,
            KarmaHubError::InvalidStateTransition { .. } => false,
            KarmaHubError::Conflict(_) => false,
            KarmaHubError::Redis(_) => true,
            KarmaHubError::Http(_) => true,
            KarmaHubError::Serialization(_) => false,
            KarmaHubError::Io(_) => true,
            KarmaHubError::Token(_) => false,
            KarmaHubError::Authentication(_) => false,
            KarmaHubError::RateLimitExceeded => true,
            KarmaHubError::InvalidInput(_) => false,
            KarmaHubError::PayloadTooLarge(_) => false,
            KarmaHubError::PasswordHash(_) => false,
            KarmaHubError::ServiceUnavailable(_) => true,
            KarmaHubError::UrlParse(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            KarmaHubError::Database(_) => ErrorSeverity::Critical,
            KarmaHubError::Migration(_) => ErrorSeverity::Critical,
            KarmaHubError::Config(_) => ErrorSeverity::Critical,
            KarmaHubError::PermissionDenied(_) => ErrorSeverity::Warning,
            KarmaHubError::Authentication(_) => ErrorSeverity::Warning,
            KarmaHubError::Token(_) => ErrorSeverity::Warning,
            KarmaHubError::RateLimitExceeded => ErrorSeverity::Warning,
            KarmaHubError::InvalidInput(_) | KarmaHubError::PayloadTooLarge(_) => ErrorSeverity::Info,
            KarmaHubError::Conflict(_) => ErrorSeverity::Info,
            KarmaHubError::InvalidStateTransition { .. } => ErrorSeverity::Info,
            KarmaHubError::ProfileNotFound { .. }
            | KarmaHubError::ListingNotFound { .. }
            | KarmaHubError::TransactionNotFound { .. }
            | KarmaHubError::EventNotFound { .. }
            | KarmaHubError::NotFound { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status code the error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            KarmaHubError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            KarmaHubError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            KarmaHubError::Authentication(_) | KarmaHubError::Token(_) => StatusCode::UNAUTHORIZED,
            KarmaHubError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            KarmaHubError::ProfileNotFound { .. }
            | KarmaHubError::ListingNotFound { .. }
            | KarmaHubError::TransactionNotFound { .. }
            | KarmaHubError::EventNotFound { .. }
            | KarmaHubError::NotFound { .. } => StatusCode::NOT_FOUND,
            KarmaHubError::Conflict(_) | KarmaHubError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            KarmaHubError::RateLimitExceeded | KarmaHubError::Ai(AiError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            KarmaHubError::Ai(AiError::CreditsDepleted) => StatusCode::PAYMENT_REQUIRED,
            KarmaHubError::Ai(AiError::NotConfigured) | KarmaHubError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            KarmaHubError::Ai(_) | KarmaHubError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "invalid_input",
            StatusCode::UNAUTHORIZED => "unauthenticated",
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::CONFLICT => "conflict",
            StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
            StatusCode::TOO_MANY_REQUESTS => "rate_limited",
            StatusCode::PAYMENT_REQUIRED => "payment_required",
            StatusCode::SERVICE_UNAVAILABLE => "unavailable",
            StatusCode::BAD_GATEWAY => "upstream_error",
            _ => "internal",
        }
    }

    /// Message safe to show to API clients
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::BAD_GATEWAY => match self {
                KarmaHubError::Ai(e) => e.to_string(),
                _ => "Failed to generate post".to_string(),
            },
            StatusCode::UNAUTHORIZED => match self {
                KarmaHubError::Token(_) => "Invalid or expired token".to_string(),
                other => other.to_string(),
            },
            _ => match self {
                KarmaHubError::Ai(e) => e.to_string(),
                other => other.to_string(),
            },
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for KarmaHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.severity() >= ErrorSeverity::Error {
            error!(error = %self, severity = %self.severity(), "Request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        assert_eq!(KarmaHubError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(KarmaHubError::Authentication("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(KarmaHubError::PermissionDenied("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(KarmaHubError::EventNotFound { event_id: Uuid::nil() }.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            KarmaHubError::InvalidStateTransition { from: "paid".into(), to: "failed".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(KarmaHubError::Ai(AiError::CreditsDepleted).status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(KarmaHubError::Ai(AiError::RateLimited).status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(KarmaHubError::Ai(AiError::EmptyResponse).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(KarmaHubError::PayloadTooLarge("x".into()).kind(), "payload_too_large");
    }

    #[test]
    fn test_hashing_failure_is_internal() {
        let err = KarmaHubError::PasswordHash("salt too short".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = KarmaHubError::Config("secret connection string".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn test_ai_messages_are_user_facing() {
        let err = KarmaHubError::Ai(AiError::CreditsDepleted);
        assert_eq!(err.public_message(), "AI credits depleted. Please add credits to your workspace.");
        let err = KarmaHubError::Ai(AiError::EmptyResponse);
        assert_eq!(err.public_message(), "No content generated");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert_eq!(KarmaHubError::RateLimitExceeded.severity(), ErrorSeverity::Warning);
        assert!(KarmaHubError::RateLimitExceeded.is_recoverable());
    }
}
