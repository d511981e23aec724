//! Admin dashboard statistics

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::database::DatabaseService;
use crate::models::ListingStatus;
use crate::services::redis::RedisService;
use crate::utils::errors::Result;

const STATS_CACHE_KEY: &str = "dashboard:stats";
pub const MAX_STATS_TTL_SECONDS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_listings: i64,
    pub active_listings: i64,
    pub total_events: i64,
    pub upcoming_events: i64,
    pub total_posts: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    database: DatabaseService,
    redis: RedisService,
}

impl DashboardService {
    pub fn new(database: DatabaseService, redis: RedisService) -> Self {
        Self { database, redis }
    }

    fn cache_ttl(&self) -> u64 {
        self.redis.default_ttl().min(MAX_STATS_TTL_SECONDS)
    }

    /// Current statistics, served from cache when fresh
    pub async fn stats(&self) -> Result<DashboardStats> {
        match self.redis.get::<DashboardStats>(STATS_CACHE_KEY).await {
            Ok(Some(stats)) => {
                debug!("Dashboard stats served from cache");
                return Ok(stats);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Dashboard cache read failed; querying database"),
        }

        let stats = self.compute().await?;
        if let Err(e) = self.redis.set(STATS_CACHE_KEY, &stats, Some(self.cache_ttl())).await {
            warn!(error = %e, "Dashboard cache write failed");
        }
        Ok(stats)
    }

    async fn compute(&self) -> Result<DashboardStats> {
        let now = Utc::now();
        let db = &self.database;
        let (total_users, total_listings, active_listings, total_events, upcoming_events, total_posts) = futures::try_join!(
            db.profiles.count(),
            db.listings.count(),
            db.listings.count_by_status(ListingStatus::Active),
            db.events.count(),
            db.events.count_upcoming(now),
            db.posts.count(),
        )?;

        Ok(DashboardStats {
            total_users,
            total_listings,
            active_listings,
            total_events,
            upcoming_events,
            total_posts,
        })
    }
}
