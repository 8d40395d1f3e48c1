// ============================================================================
// CSRF Token Service
// ============================================================================
//
// Stateless anti-forgery tokens for browser-submitted forms:
// - Payload format: "<millis>.<nonce>", embedded in a hidden form field at
//   render time.
// - Signature: HMAC-SHA256 of the payload, base64url-encoded, carried in an
//   HttpOnly `csrf_sig` cookie with a 10-minute max age.
//
// Verification recomputes the signature from the submitted payload and
// compares it against the cookie in constant time. Every failure mode maps
// to `false`; this module never raises.
//
// ============================================================================

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Name of the signature cookie set alongside the client-visible payload.
pub const COOKIE_NAME: &str = "csrf_sig";

/// Token lifetime enforced at verification time.
pub const MAX_AGE_MS: u64 = 10 * 60 * 1000;

/// Cookie max-age matching [`MAX_AGE_MS`].
pub const COOKIE_MAX_AGE_SECS: u64 = 10 * 60;

const NONCE_BYTES: usize = 12;

/// A freshly issued token pair: the payload goes into a hidden form field,
/// the signature into the `csrf_sig` cookie.
#[derive(Debug, Clone)]
pub struct IssuedCsrf {
    pub payload: String,
    pub signature: String,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub(crate) fn sign(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Issues a token pair bound to the current time and a random nonce.
pub fn issue(secret: &str) -> IssuedCsrf {
    let mut nonce = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut nonce);
    let payload = format!("{}.{}", now_millis(), URL_SAFE_NO_PAD.encode(nonce));
    let signature = sign(secret, &payload);
    IssuedCsrf { payload, signature }
}

/// Verifies a submitted payload against the signature cookie and TTL.
///
/// Fails closed on every degraded input: missing secret, missing cookie or
/// payload, unparseable timestamp, expired token, or signature mismatch.
/// A signature length mismatch is rejected before the constant-time
/// comparison is attempted.
pub fn verify(
    secret: Option<&str>,
    cookie_sig: Option<&str>,
    payload: &str,
    max_age_ms: u64,
) -> bool {
    let Some(secret) = secret else {
        return false;
    };
    let cookie_sig = match cookie_sig {
        Some(sig) if !sig.is_empty() => sig,
        _ => return false,
    };
    if payload.is_empty() {
        return false;
    }

    let issued_at: u64 = match payload.split('.').next().and_then(|ts| ts.parse().ok()) {
        Some(ts) => ts,
        None => return false,
    };
    if now_millis().saturating_sub(issued_at) > max_age_ms {
        return false;
    }

    let expected = sign(secret, payload);
    if expected.len() != cookie_sig.len() {
        return false;
    }
    bool::from(expected.as_bytes().ct_eq(cookie_sig.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret-0123456789abcdef";

    #[test]
    fn test_issue_then_verify() {
        let issued = issue(SECRET);
        assert!(verify(
            Some(SECRET),
            Some(&issued.signature),
            &issued.payload,
            MAX_AGE_MS
        ));
    }

    #[test]
    fn test_verify_fails_without_secret() {
        let issued = issue(SECRET);
        assert!(!verify(None, Some(&issued.signature), &issued.payload, MAX_AGE_MS));
    }

    #[test]
    fn test_verify_fails_without_cookie_or_payload() {
        let issued = issue(SECRET);
        assert!(!verify(Some(SECRET), None, &issued.payload, MAX_AGE_MS));
        assert!(!verify(Some(SECRET), Some(""), &issued.payload, MAX_AGE_MS));
        assert!(!verify(Some(SECRET), Some(&issued.signature), "", MAX_AGE_MS));
    }

    #[test]
    fn test_verify_fails_after_ttl() {
        // Craft a payload issued just past the TTL and sign it properly.
        let stale = format!("{}.c3RhbGVub25jZQ", now_millis() - MAX_AGE_MS - 1);
        let signature = sign(SECRET, &stale);
        assert!(!verify(Some(SECRET), Some(&signature), &stale, MAX_AGE_MS));

        // The same payload within the window verifies.
        let fresh = format!("{}.c3RhbGVub25jZQ", now_millis() - 1000);
        let signature = sign(SECRET, &fresh);
        assert!(verify(Some(SECRET), Some(&signature), &fresh, MAX_AGE_MS));
    }

    #[test]
    fn test_verify_rejects_tampered_cookie() {
        let issued = issue(SECRET);
        let mut tampered = issued.signature.into_bytes();
        tampered[0] = if tampered[0] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(!verify(Some(SECRET), Some(&tampered), &issued.payload, MAX_AGE_MS));
    }

    #[test]
    fn test_verify_rejects_rewritten_timestamp() {
        // Swapping in a future timestamp invalidates the signature even
        // though the TTL check cannot catch it.
        let issued = issue(SECRET);
        let nonce = issued.payload.split('.').nth(1).unwrap();
        let forged = format!("{}.{}", now_millis() + 5 * 60 * 1000, nonce);
        assert!(!verify(Some(SECRET), Some(&issued.signature), &forged, MAX_AGE_MS));
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let issued = issue(SECRET);
        let truncated = &issued.signature[..issued.signature.len() - 2];
        assert!(!verify(Some(SECRET), Some(truncated), &issued.payload, MAX_AGE_MS));
    }

    #[test]
    fn test_verify_rejects_garbage_payload() {
        let issued = issue(SECRET);
        assert!(!verify(Some(SECRET), Some(&issued.signature), "not-a-timestamp.x", MAX_AGE_MS));
    }
}
