// ============================================================================
// Admission Gate
// ============================================================================
//
// Cheap, ordered, side-effect-free checks that every browser-submitted form
// must clear before any business logic runs:
//
// 1. Origin header, when present, must contain the request host
// 2. Referer header, when present, must contain the request host
// 3. Honeypot field must be empty
// 4. Render timestamp must be at least 3 seconds old
// 5. CSRF payload must verify against the signature cookie
//
// Evaluation short-circuits on the first failure. The denial reason is for
// logging only; callers surface one generic message so automated probing
// cannot learn which defense triggered.
//
// ============================================================================

use axum::http::{header, HeaderMap};
use std::fmt;

use crate::csrf;

/// Minimum milliseconds between form render and submission. Anything faster
/// is treated as scripted.
pub const MIN_RENDER_TO_SUBMIT_MS: u64 = 3000;

/// Why a submission was refused. Never shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Origin,
    Referer,
    Honeypot,
    TooFast,
    Token,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Denial::Origin => "origin mismatch",
            Denial::Referer => "referer mismatch",
            Denial::Honeypot => "honeypot field filled",
            Denial::TooFast => "submitted too fast after render",
            Denial::Token => "csrf verification failed",
        };
        f.write_str(reason)
    }
}

/// The anti-automation fields every form carries alongside its visible
/// fields.
#[derive(Debug, Clone, Copy)]
pub struct FormDefenses<'a> {
    /// Honeypot field, invisible to humans. Any value means a bot.
    pub honeypot: &'a str,
    /// Millisecond timestamp stamped into the form at render time.
    pub form_ts: &'a str,
    /// Hidden CSRF payload issued with the page.
    pub csrf_token: &'a str,
}

/// Extracts a cookie value from the Cookie request header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for cookie in cookies.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{}=", name)) {
            return Some(value.to_string());
        }
    }
    None
}

/// Runs the ordered admission checks for one browser submission.
pub fn admit(
    headers: &HeaderMap,
    defenses: &FormDefenses<'_>,
    signing_secret: Option<&str>,
) -> Result<(), Denial> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if let Some(origin) = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) {
        if host.is_empty() || !origin.contains(host) {
            return Err(Denial::Origin);
        }
    }

    if let Some(referer) = headers.get(header::REFERER).and_then(|v| v.to_str().ok()) {
        if host.is_empty() || !referer.contains(host) {
            return Err(Denial::Referer);
        }
    }

    if !defenses.honeypot.trim().is_empty() {
        return Err(Denial::Honeypot);
    }

    let rendered_at: u64 = defenses
        .form_ts
        .trim()
        .parse()
        .map_err(|_| Denial::TooFast)?;
    if csrf::now_millis().saturating_sub(rendered_at) < MIN_RENDER_TO_SUBMIT_MS {
        return Err(Denial::TooFast);
    }

    let cookie = cookie_value(headers, csrf::COOKIE_NAME);
    if !csrf::verify(
        signing_secret,
        cookie.as_deref(),
        defenses.csrf_token,
        csrf::MAX_AGE_MS,
    ) {
        return Err(Denial::Token);
    }

    Ok(())
}
