//! Services module
//!
//! This module contains business logic services

pub mod ai;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod marketplace;
pub mod posts;
pub mod profiles;
pub mod redis;
pub mod registrations;
pub mod storage;

// Re-export commonly used services
pub use ai::{AiClient, PromptSet};
pub use attendance::{AttendanceService, AttendanceCsv, CheckInSubmission};
pub use auth::{AuthService, Claims, Session, SignInRequest, SignUpRequest};
pub use dashboard::{DashboardService, DashboardStats};
pub use events::EventService;
pub use marketplace::MarketplaceService;
pub use posts::PostService;
pub use profiles::ProfileService;
pub use redis::RedisService;
pub use registrations::RegistrationService;
pub use storage::{StorageService, UploadedFile};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::middleware::rate_limit::UserRateLimiter;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub marketplace_service: MarketplaceService,
    pub event_service: EventService,
    pub attendance_service: AttendanceService,
    pub registration_service: RegistrationService,
    pub post_service: PostService,
    pub dashboard_service: DashboardService,
    pub storage_service: StorageService,
    pub redis_service: RedisService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, database: DatabaseService) -> Result<Self> {
        let redis_service = RedisService::new(settings.redis.clone())?;
        let storage_service = StorageService::new(settings.storage.clone());
        let prompts = PromptSet::load(settings.ai.prompts_path.as_deref())?;
        let ai_client = AiClient::new(settings.ai.clone(), prompts)?;
        let limiter = UserRateLimiter::per_minute(settings.ai.requests_per_minute);

        Ok(Self {
            auth_service: AuthService::new(
                database.accounts.clone(),
                database.profiles.clone(),
                settings.auth.clone(),
            ),
            profile_service: ProfileService::new(database.profiles.clone()),
            marketplace_service: MarketplaceService::new(
                database.listings.clone(),
                database.transactions.clone(),
                storage_service.clone(),
            ),
            event_service: EventService::new(database.events.clone()),
            attendance_service: AttendanceService::new(
                database.events.clone(),
                database.attendances.clone(),
                storage_service.clone(),
            ),
            registration_service: RegistrationService::new(
                database.events.clone(),
                database.registrations.clone(),
                storage_service.clone(),
            ),
            post_service: PostService::new(
                database.posts.clone(),
                database.events.clone(),
                ai_client,
                limiter,
            ),
            dashboard_service: DashboardService::new(database, redis_service.clone()),
            storage_service,
            redis_service,
        })
    }
}
