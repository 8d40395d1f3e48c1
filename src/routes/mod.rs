// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: Main router assembly and health endpoint
// - csrf.rs: CSRF token issuance
// - forms.rs: Browser-facing form submission handlers
// - notify.rs: Server-to-server notification dispatch endpoints
// - auth.rs: Shared-secret API key verification
// - middleware.rs: Request logging and security headers
//
// ============================================================================

mod auth;
mod csrf;
mod forms;
mod middleware;
mod notify;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no defenses needed)
        .route("/health", get(health_check))
        // CSRF token issuance for form renders
        .route("/api/csrf-token", get(csrf::issue_token))
        // Browser-facing form submissions (admission gate applies)
        .route("/forms/booking-request", post(forms::submit_booking))
        .route("/forms/testimonial", post(forms::submit_testimonial))
        // Server-to-server dispatch (x-api-key applies)
        .route("/notify/booking-request", post(notify::booking_request))
        .route("/notify/testimonial", post(notify::testimonial))
        // Apply middleware (order matters - last added runs first)
        .layer(
            ServiceBuilder::new()
                // Tracing layer (outermost - runs first)
                .layer(TraceLayer::new_for_http())
                // Request logging
                .layer(axum::middleware::from_fn(middleware::request_logging))
                // Security headers
                .layer(axum::middleware::from_fn(middleware::security_headers))
                .into_inner(),
        )
        .with_state(app_context)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
