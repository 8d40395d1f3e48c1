use crate::channels::{EmailChannel, SlackChannel};
use crate::config::Config;
use crate::dispatch::{Dispatcher, NotificationChannel};
use std::sync::Arc;
use std::time::Duration;

/// Application context containing shared dependencies
/// This reduces parameter passing and makes it easier to add new dependencies
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Shared HTTP client used by the channel adapters and the
    /// browser-to-notify forward.
    pub http: reqwest::Client,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppContext {
    /// Creates a new application context with the fixed channel set.
    pub fn new(config: Arc<Config>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let channels: Vec<Arc<dyn NotificationChannel>> = vec![
            Arc::new(EmailChannel::new(http.clone(), config.email.clone())),
            Arc::new(SlackChannel::new(http.clone(), config.slack.clone())),
        ];

        Self {
            config,
            http,
            dispatcher: Arc::new(Dispatcher::new(channels)),
        }
    }
}
