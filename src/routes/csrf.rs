// ============================================================================
// CSRF Token Issuance
// ============================================================================
//
// GET /api/csrf-token hands a form render its anti-forgery pair: the
// payload for a hidden field and the HttpOnly signature cookie. When no
// signing secret is configured the payload is null and any later
// verification fails closed.
//
// ============================================================================

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::csrf;

/// GET /api/csrf-token
/// Issues a token payload and sets the matching signature cookie.
pub async fn issue_token(State(app_context): State<Arc<AppContext>>) -> impl IntoResponse {
    let Some(secret) = app_context.config.signing_secret.as_deref() else {
        tracing::warn!("csrf token requested but no signing secret is configured");
        return Json(json!({ "csrfToken": null })).into_response();
    };

    let issued = csrf::issue(secret);

    // Build cookie value with security attributes
    let mut cookie_value = format!(
        "{}={}; SameSite=Lax; HttpOnly; Path=/; Max-Age={}",
        csrf::COOKIE_NAME,
        issued.signature,
        csrf::COOKIE_MAX_AGE_SECS
    );
    if !app_context.config.environment.is_development() {
        cookie_value.push_str("; Secure");
    }

    let mut response = Json(json!({ "csrfToken": issued.payload })).into_response();
    if let Ok(header_value) = HeaderValue::from_str(&cookie_value) {
        response.headers_mut().insert(SET_COOKIE, header_value);
    }

    response
}
