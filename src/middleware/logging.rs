//! Request logging middleware
//!
//! Logs one line per request with the propagated request id and latency.

use std::time::Instant;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log method, path, status and latency of every request
pub async fn log_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        warn!(request_id = %request_id, method = %method, path = %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        info!(request_id = %request_id, method = %method, path = %path, status = status.as_u16(), elapsed_ms, "Request handled");
    }
    response
}
