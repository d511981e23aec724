//! HTTP server and route table

use std::net::SocketAddr;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use crate::config::ServerConfig;
use crate::handlers::{admin, auth, events, health, listings, posts, profiles};
use crate::middleware::{log_requests, logging::REQUEST_ID_HEADER};
use crate::state::AppState;
use crate::utils::errors::{KarmaHubError, Result};

/// Routes mounted under `/api/v1`
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/me", get(profiles::get_me).patch(profiles::update_me))
        .route("/me/listings", get(profiles::my_listings))
        .route("/me/purchases", get(profiles::my_purchases))
        .route("/me/transactions", get(profiles::my_transactions))
        .route("/me/attendances", get(profiles::my_attendances))
        .route("/me/registrations", get(profiles::my_registrations))
        .route("/me/posts", get(profiles::my_posts))
        .route("/profiles/:id", get(profiles::get_profile))
        .route("/listings", get(listings::browse).post(listings::create_listing))
        .route(
            "/listings/:id",
            get(listings::get_listing)
                .patch(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .route("/listings/:id/images", post(listings::attach_image))
        .route("/listings/:id/purchase", post(listings::start_purchase))
        .route("/transactions/:id/pay", post(listings::confirm_payment))
        .route("/transactions/:id/cancel", post(listings::cancel_payment))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/check-in", post(events::check_in))
        .route("/events/:id/check-out", post(events::check_out))
        .route("/events/:id/register", post(events::register))
        .route("/posts", get(profiles::my_posts))
        .route("/posts/generate", post(posts::generate))
        .route("/posts/:id", axum::routing::delete(posts::delete_post))
        .route("/templates", get(posts::list_templates).post(posts::create_template))
        .route("/templates/:id", axum::routing::delete(posts::delete_template))
        .nest("/admin", admin_routes())
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/users", get(admin::list_users))
        .route("/users/:id/role", put(admin::set_role))
        .route("/listings", get(admin::list_listings))
        .route("/events", post(admin::create_event))
        .route(
            "/events/:id",
            axum::routing::patch(admin::update_event).delete(admin::delete_event),
        )
        .route("/events/:id/attendance", get(admin::event_attendance))
        .route("/events/:id/attendance.csv", get(admin::export_attendance))
        .route("/events/:id/registrations", get(admin::event_registrations))
        .route("/attendance/:id/status", put(admin::set_attendance_status))
        .route("/registrations/:id/review", put(admin::review_registration))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

    if config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers(Any)
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let files = ServeDir::new(state.services.storage_service.root_dir());
    let body_limit = state.settings.server.request_body_limit_bytes;
    let cors = cors_layer(&state.settings.server);

    Router::new()
        .route("/healthz", get(health::health_check))
        .route("/readyz", get(health::readiness_check))
        .nest("/api/v1", api_routes())
        .nest_service("/files", files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_requests))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors),
        )
        .with_state(state)
}

/// HTTP server bound to the configured address
pub struct Server {
    addr: SocketAddr,
    router: Router,
}

impl Server {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr = state
            .settings
            .server
            .bind_addr
            .parse()
            .map_err(|e| KarmaHubError::Config(format!("Invalid server.bind_addr: {}", e)))?;

        Ok(Self {
            addr,
            router: build_router(state),
        })
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
