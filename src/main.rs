//! Campus Karma Hub
//!
//! Main application entry point

use anyhow::Context;
use tracing::info;

use KarmaHub::{
    config::Settings,
    database::connection::{create_pool, run_migrations},
    server::Server,
    state::AppState,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", KarmaHub::info());

    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;

    info!("Running database migrations...");
    run_migrations(&pool).await?;

    tokio::fs::create_dir_all(&settings.storage.root_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", settings.storage.root_dir))?;

    info!("Initializing services...");
    let state = AppState::new(settings, pool)?;
    if !state.services.post_service.ai_configured() {
        tracing::warn!("AI gateway key is not set; post generation will be unavailable");
    }

    Server::new(state)?.run().await?;

    info!("Karma Hub shut down");
    Ok(())
}
