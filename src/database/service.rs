//! Database service layer
//!
//! This module bundles every repository behind one cloneable handle

use crate::database::{
    DatabasePool, AccountRepository, ProfileRepository, ListingRepository, TransactionRepository,
    EventRepository, AttendanceRepository, RegistrationRepository, PostRepository,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub pool: DatabasePool,
    pub accounts: AccountRepository,
    pub profiles: ProfileRepository,
    pub listings: ListingRepository,
    pub transactions: TransactionRepository,
    pub events: EventRepository,
    pub attendances: AttendanceRepository,
    pub registrations: RegistrationRepository,
    pub posts: PostRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            listings: ListingRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            attendances: AttendanceRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            pool,
        }
    }

    /// Ping the database
    pub async fn health_check(&self) -> Result<(), crate::utils::errors::KarmaHubError> {
        super::connection::health_check(&self.pool).await
    }
}
