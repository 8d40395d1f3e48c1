use anyhow::Result;
use rand::{rngs::OsRng, RngCore};

use crate::submission::SubmissionKind;

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_PORT: u16 = 8080;

// ============================================================================
// Configuration Structures
// ============================================================================

/// Deployment environment. Controls the Secure cookie attribute and whether
/// the process-lifetime fallback signing secret may be generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Mail provider configuration. The provider is a plain HTTP JSON API; a
/// missing endpoint or empty recipient list surfaces as a delivery failure,
/// not a startup error.
#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub from: String,
    pub recipients: Vec<String>,
    pub api_url: Option<String>,
    pub api_token: Option<String>,
}

/// Slack delivery configuration. Each submission kind posts to its own
/// channel.
#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub bot_token: Option<String>,
    pub booking_channel_id: Option<String>,
    pub testimonials_channel_id: Option<String>,
    /// Override for the chat.postMessage endpoint. Defaults to the public
    /// Slack API.
    pub api_url: Option<String>,
}

/// Process-wide configuration, resolved once at startup and shared by
/// reference. Secrets are never re-resolved per request.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,
    /// HMAC key for CSRF token signing. `None` leaves token issuance
    /// degraded: no token is handed out and verification fails closed.
    pub signing_secret: Option<String>,
    /// Shared secret for the booking notification endpoint.
    pub booking_api_secret: Option<String>,
    /// Shared secret for the testimonial notification endpoint.
    pub testimonial_api_secret: Option<String>,
    /// Base URL the browser-facing form handlers forward submissions to.
    pub notify_api_url: String,
    pub email: EmailConfig,
    pub slack: SlackConfig,
    /// Salt for log-safe identifier hashing.
    pub log_hash_salt: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("development") | Ok("dev") => Environment::Development,
            _ => Environment::Production,
        };

        Ok(Self {
            port,
            environment,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            signing_secret: resolve_signing_secret(environment),
            booking_api_secret: non_empty_var("BOOKING_API_SECRET"),
            testimonial_api_secret: non_empty_var("TESTIMONIAL_API_SECRET"),
            notify_api_url: std::env::var("NOTIFY_API_URL")
                .unwrap_or_else(|_| format!("http://127.0.0.1:{}", port)),
            email: EmailConfig {
                from: std::env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "no-reply@localhost".to_string()),
                recipients: std::env::var("EMAIL_TO")
                    .map(|list| parse_recipient_list(&list))
                    .unwrap_or_default(),
                api_url: non_empty_var("EMAIL_API_URL"),
                api_token: non_empty_var("EMAIL_API_TOKEN"),
            },
            slack: SlackConfig {
                bot_token: non_empty_var("SLACK_BOT_TOKEN"),
                booking_channel_id: non_empty_var("SLACK_BOOKING_REQUESTS_CHANNEL_ID"),
                testimonials_channel_id: non_empty_var("SLACK_TESTIMONIALS_CHANNEL_ID"),
                api_url: non_empty_var("SLACK_API_URL"),
            },
            log_hash_salt: std::env::var("LOG_HASH_SALT")
                .unwrap_or_else(|_| "intake-server".to_string()),
        })
    }

    /// The shared secret expected on the notification endpoint for the
    /// given submission kind.
    pub fn api_secret(&self, kind: SubmissionKind) -> Option<&str> {
        match kind {
            SubmissionKind::Booking => self.booking_api_secret.as_deref(),
            SubmissionKind::Testimonial => self.testimonial_api_secret.as_deref(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Splits a recipient list on commas and whitespace, dropping empties.
pub fn parse_recipient_list(list: &str) -> Vec<String> {
    list.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves the CSRF signing secret: environment variable first, then a
/// mounted secret file, then a process-lifetime random fallback that is
/// only ever generated in development. In production a missing secret
/// stays missing, leaving issuance degraded and verification failing
/// closed.
fn resolve_signing_secret(environment: Environment) -> Option<String> {
    if let Some(secret) = non_empty_var("SIGNING_SECRET") {
        return Some(secret);
    }

    if let Some(path) = non_empty_var("SIGNING_SECRET_FILE") {
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let secret = contents.trim().to_string();
                if !secret.is_empty() {
                    return Some(secret);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "Failed to read signing secret file");
            }
        }
    }

    if environment.is_development() {
        tracing::warn!("No signing secret configured - generating a process-lifetime development secret");
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let secret: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        return Some(secret);
    }

    None
}
