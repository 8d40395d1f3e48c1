// ============================================================================
// Notification Dispatch Endpoints
// ============================================================================
//
// Server-to-server endpoints taking a JSON submission plus the x-api-key
// header. Authentication, validation, then one concurrent fan-out across
// the configured channels. Any channel failure turns the whole request
// into a 500 whose body joins the per-channel errors - the caller retries
// the entire submission or not at all.
//
// ============================================================================

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::routes::auth::require_api_key;
use crate::submission::{BookingFields, SubmissionKind, SubmissionRecord, TestimonialFields};
use crate::utils::log_safe_id;

/// POST /notify/booking-request
pub async fn booking_request(
    State(app_context): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(fields): Json<BookingFields>,
) -> AppResult<Json<Value>> {
    require_api_key(&headers, app_context.config.api_secret(SubmissionKind::Booking))?;

    let record = fields
        .validate()
        .map_err(|_| AppError::validation("Missing required fields"))?;

    dispatch(&app_context, SubmissionRecord::Booking(record)).await
}

/// POST /notify/testimonial
pub async fn testimonial(
    State(app_context): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(fields): Json<TestimonialFields>,
) -> AppResult<Json<Value>> {
    require_api_key(
        &headers,
        app_context.config.api_secret(SubmissionKind::Testimonial),
    )?;

    let record = fields
        .validate()
        .map_err(|_| AppError::validation("Missing required fields"))?;

    dispatch(&app_context, SubmissionRecord::Testimonial(record)).await
}

async fn dispatch(
    app_context: &AppContext,
    record: SubmissionRecord,
) -> AppResult<Json<Value>> {
    tracing::info!(
        kind = %record.kind(),
        submitter_hash = %log_safe_id(&record.primary_name(), &app_context.config.log_hash_salt),
        "dispatching submission"
    );

    let result = app_context.dispatcher.dispatch(&record).await;
    if let Some(errors) = result.error_summary() {
        return Err(AppError::Dispatch(errors));
    }

    Ok(Json(json!({ "ok": true })))
}
