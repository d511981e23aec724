//! Campus Karma Hub
//!
//! Backend for a student community app: a campus marketplace, event
//! check-in with geofencing and proof uploads, event registrations, and an
//! AI LinkedIn post generator, with an admin dashboard on top.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod handlers;
pub mod import;
pub mod middleware;
pub mod models;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{KarmaHubError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
