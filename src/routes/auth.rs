// ============================================================================
// API Key Authentication
// ============================================================================
//
// Shared-secret verification for the server-to-server notification
// endpoints. Independent of the browser-facing CSRF gate: this guards a
// different trust boundary.
//
// ============================================================================

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Verifies the `x-api-key` header against the configured shared secret.
///
/// A missing secret is a server fault (the endpoint is unusable until
/// configured); a missing or mismatched header is a client fault. The
/// comparison is constant time.
pub fn require_api_key(headers: &HeaderMap, expected: Option<&str>) -> Result<(), AppError> {
    let expected = expected
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| AppError::config("notification shared secret is not set"))?;

    let provided = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Forbidden)?;

    if provided.len() != expected.len()
        || !bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
    {
        return Err(AppError::Forbidden);
    }

    Ok(())
}
