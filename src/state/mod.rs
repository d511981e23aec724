//! Shared application state
//!
//! Handed to every request handler through axum's `State`.

use std::sync::Arc;
use crate::config::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub database: DatabaseService,
    pub services: ServiceFactory,
}

impl AppState {
    /// Wire repositories and services on top of a connection pool
    pub fn new(settings: Settings, pool: DatabasePool) -> Result<Self> {
        let database = DatabaseService::new(pool);
        let services = ServiceFactory::new(&settings, database.clone())?;

        Ok(Self {
            settings: Arc::new(settings),
            database,
            services,
        })
    }
}
