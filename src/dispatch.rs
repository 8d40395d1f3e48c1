// ============================================================================
// Notification Dispatch
// ============================================================================
//
// Fans one validated submission out to every configured channel at once and
// waits for all attempts to settle. A failing channel never cancels or
// delays the others; each channel gets exactly one attempt per submission.
//
// ============================================================================

use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;
use std::fmt;
use std::sync::Arc;

use crate::submission::SubmissionRecord;

/// The fixed set of notification sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Email,
    Slack,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::Slack => "slack",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delivery mechanism for a normalized submission. Implementations
/// render the submission into their channel-specific payload and perform a
/// single delivery attempt.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// Performs exactly one delivery attempt. Configuration problems are
    /// delivery failures too; they surface here, not at startup.
    async fn deliver(&self, submission: &SubmissionRecord) -> Result<()>;
}

/// The result of one channel's delivery attempt.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub channel: ChannelKind,
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of one fan-out. Success requires every channel to have
/// succeeded.
#[derive(Debug)]
pub struct DispatchResult {
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchResult {
    pub fn overall_success(&self) -> bool {
        self.outcomes.iter().all(DispatchOutcome::succeeded)
    }

    /// All channel failures joined into one caller-facing string, in
    /// channel order. `None` when every channel succeeded.
    pub fn error_summary(&self) -> Option<String> {
        let errors: Vec<&str> = self
            .outcomes
            .iter()
            .filter_map(|outcome| outcome.error.as_deref())
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        }
    }
}

/// Concurrent best-effort fan-out over a fixed channel set.
pub struct Dispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Attempts delivery on every channel concurrently and waits for all of
    /// them to settle, collecting one outcome per channel.
    pub async fn dispatch(&self, submission: &SubmissionRecord) -> DispatchResult {
        let attempts = self.channels.iter().map(|channel| async move {
            match channel.deliver(submission).await {
                Ok(()) => {
                    tracing::info!(
                        channel = %channel.kind(),
                        kind = %submission.kind(),
                        "notification delivered"
                    );
                    DispatchOutcome {
                        channel: channel.kind(),
                        error: None,
                    }
                }
                Err(err) => {
                    tracing::error!(
                        channel = %channel.kind(),
                        kind = %submission.kind(),
                        error = %err,
                        "notification delivery failed"
                    );
                    DispatchOutcome {
                        channel: channel.kind(),
                        error: Some(err.to_string()),
                    }
                }
            }
        });

        DispatchResult {
            outcomes: join_all(attempts).await,
        }
    }
}
