// ============================================================================
// Slack Channel
// ============================================================================
//
// Renders a submission into a flat fallback text plus a Block Kit layout
// and posts it with chat.postMessage. The Slack API can answer HTTP 200
// with `"ok": false` in the body, so both the transport status and the
// application-level flag are checked.
//
// ============================================================================

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::SlackConfig;
use crate::dispatch::{ChannelKind, NotificationChannel};
use crate::submission::{BookingRequest, SubmissionKind, SubmissionRecord, Testimonial};

const DEFAULT_API_URL: &str = "https://slack.com/api/chat.postMessage";

pub struct SlackChannel {
    http: reqwest::Client,
    config: SlackConfig,
}

impl SlackChannel {
    pub fn new(http: reqwest::Client, config: SlackConfig) -> Self {
        Self { http, config }
    }

    fn api_url(&self) -> &str {
        self.config
            .api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }

    fn channel_for(&self, kind: SubmissionKind) -> Option<&str> {
        let channel = match kind {
            SubmissionKind::Booking => self.config.booking_channel_id.as_deref(),
            SubmissionKind::Testimonial => self.config.testimonials_channel_id.as_deref(),
        };
        channel.filter(|id| !id.is_empty())
    }
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Slack
    }

    async fn deliver(&self, submission: &SubmissionRecord) -> Result<()> {
        let token = self.config.bot_token.as_deref().filter(|t| !t.is_empty());
        let channel = self.channel_for(submission.kind());
        let (Some(token), Some(channel)) = (token, channel) else {
            bail!("Slack not configured");
        };

        let (fallback, blocks) = render(submission);
        let response = self
            .http
            .post(self.api_url())
            .bearer_auth(token)
            .json(&json!({
                "channel": channel,
                "text": fallback,
                "blocks": blocks,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Slack HTTP {}", response.status().as_u16());
        }
        let body: Value = response.json().await.unwrap_or_default();
        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            bail!(
                "Slack error: {}",
                body.get("error").and_then(Value::as_str).unwrap_or("unknown")
            );
        }
        Ok(())
    }
}

fn render(submission: &SubmissionRecord) -> (String, Value) {
    match submission {
        SubmissionRecord::Booking(booking) => render_booking(booking),
        SubmissionRecord::Testimonial(testimonial) => render_testimonial(testimonial),
    }
}

fn header_block(text: &str) -> Value {
    json!({
        "type": "header",
        "text": { "type": "plain_text", "text": text, "emoji": true },
    })
}

fn mrkdwn_section(text: String) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text },
    })
}

fn render_booking(booking: &BookingRequest) -> (String, Value) {
    let heading = booking.heading();

    let mut fallback_lines = vec![
        heading.clone(),
        format!("Name: {} {}", booking.first_name, booking.last_name),
        format!("Email: {}", booking.email),
        format!("Phone: {}", booking.phone),
        format!("Address: {}", booking.address),
    ];
    if !booking.details.is_empty() {
        fallback_lines.push(format!("Project Details: {}", booking.details));
    }

    let mut blocks = vec![
        header_block(&heading),
        json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*Email:*\n{}", booking.email) },
                { "type": "mrkdwn", "text": format!("*Phone:*\n{}", booking.phone) },
                { "type": "mrkdwn", "text": format!("*Address:*\n{}", booking.address) },
            ],
        }),
    ];
    if !booking.details.is_empty() {
        blocks.push(json!({ "type": "divider" }));
        blocks.push(mrkdwn_section(format!(
            "*Project Details:*\n{}",
            booking.details
        )));
    }

    (fallback_lines.join("\n"), Value::Array(blocks))
}

fn render_testimonial(testimonial: &Testimonial) -> (String, Value) {
    let heading = testimonial.heading();

    let mut fallback_lines = vec![
        heading.clone(),
        format!("Name: {}", testimonial.name),
        format!("Project Details: {}", testimonial.project_details),
        format!("Date of Project: {}", testimonial.date_of_project),
    ];
    if !testimonial.location.is_empty() {
        fallback_lines.push(format!("Location: {}", testimonial.location));
    }
    fallback_lines.push(format!("Date Submitted: {}", testimonial.date_submitted));
    fallback_lines.push(format!("Testimonial: {}", testimonial.selected_option));
    if !testimonial.additional_comments.is_empty() {
        fallback_lines.push(format!(
            "Additional Comments: {}",
            testimonial.additional_comments
        ));
    }
    fallback_lines.push(format!("Signature: {}", testimonial.signature));

    let mut blocks = vec![
        header_block(&heading),
        json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*Project Details:*\n{}", testimonial.project_details) },
                { "type": "mrkdwn", "text": format!("*Date of Project:*\n{}", testimonial.date_of_project) },
            ],
        }),
    ];

    if testimonial.location.is_empty() {
        blocks.push(json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*Date Submitted:*\n{}", testimonial.date_submitted) },
            ],
        }));
    } else {
        blocks.push(json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*Location:*\n{}", testimonial.location) },
                { "type": "mrkdwn", "text": format!("*Date Submitted:*\n{}", testimonial.date_submitted) },
            ],
        }));
    }

    blocks.push(json!({ "type": "divider" }));
    blocks.push(mrkdwn_section(format!(
        "*Testimonial:*\n{}",
        testimonial.selected_option
    )));

    if !testimonial.additional_comments.is_empty() {
        blocks.push(json!({ "type": "divider" }));
        blocks.push(mrkdwn_section(format!(
            "*Additional Comments:*\n{}",
            testimonial.additional_comments
        )));
    }

    blocks.push(json!({ "type": "divider" }));
    blocks.push(mrkdwn_section(format!(
        "*Signature:*\n{}",
        testimonial.signature
    )));

    (fallback_lines.join("\n"), Value::Array(blocks))
}
