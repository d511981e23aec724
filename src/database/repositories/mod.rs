//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod account;
pub mod profile;
pub mod listing;
pub mod transaction;
pub mod event;
pub mod attendance;
pub mod registration;
pub mod post;

// Re-export repositories
pub use account::{AccountRepository, NewAccount};
pub use profile::ProfileRepository;
pub use listing::ListingRepository;
pub use transaction::TransactionRepository;
pub use event::{EventRepository, merge_event_update};
pub use attendance::AttendanceRepository;
pub use registration::RegistrationRepository;
pub use post::PostRepository;

use crate::utils::errors::KarmaHubError;

const UNIQUE_VIOLATION: &str = "23505";

/// Turn a unique-constraint violation into a conflict carrying `message`
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> KarmaHubError {
    let is_unique = e
        .as_database_error()
        .and_then(|d| d.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false);

    if is_unique {
        KarmaHubError::Conflict(message.to_string())
    } else {
        KarmaHubError::Database(e)
    }
}
