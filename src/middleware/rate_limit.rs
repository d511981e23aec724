//! Rate limiting
//!
//! Per-user request quotas backed by an in-memory keyed `governor` limiter.

use std::num::NonZeroU32;
use std::sync::Arc;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;
use uuid::Uuid;
use crate::utils::errors::{KarmaHubError, Result};

/// Tracked keys above which idle users are dropped from the limiter
const PRUNE_THRESHOLD: usize = 10_000;

/// Limits how often each user may perform an action
#[derive(Clone)]
pub struct UserRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<Uuid>>,
    per_minute: u32,
    prune_threshold: usize,
}

impl UserRateLimiter {
    /// Allow `per_minute` requests per user per minute (at least one)
    pub fn per_minute(per_minute: u32) -> Self {
        let quota = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(quota))),
            per_minute: quota.get(),
            prune_threshold: PRUNE_THRESHOLD,
        }
    }

    pub fn with_prune_threshold(mut self, threshold: usize) -> Self {
        self.prune_threshold = threshold;
        self
    }

    /// Number of users currently holding limiter state
    pub fn tracked_users(&self) -> usize {
        self.limiter.len()
    }

    /// Forget users whose quota has fully refilled
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn limit(&self) -> u32 {
        self.per_minute
    }

    /// Consume one unit of the user's quota
    pub fn check(&self, user_id: Uuid) -> Result<()> {
        if self.limiter.len() > self.prune_threshold {
            self.prune();
        }
        match self.limiter.check_key(&user_id) {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(user_id = %user_id, limit = self.per_minute, "Rate limit exceeded");
                Err(KarmaHubError::RateLimitExceeded)
            }
        }
    }
}

impl std::fmt::Debug for UserRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRateLimiter")
            .field("per_minute", &self.per_minute)
            .finish()
    }
}
