// ============================================================================
// Email Channel
// ============================================================================
//
// Renders a submission into a subject line plus plain-text and HTML bodies
// and posts it to the configured mail provider endpoint. Field order is
// fixed per submission variant. Reply-to is set to the submitter's address
// when the variant carries one.
//
// ============================================================================

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::json;

use crate::config::EmailConfig;
use crate::dispatch::{ChannelKind, NotificationChannel};
use crate::submission::{BookingRequest, SubmissionRecord, Testimonial};

pub struct EmailChannel {
    http: reqwest::Client,
    config: EmailConfig,
}

impl EmailChannel {
    pub fn new(http: reqwest::Client, config: EmailConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn deliver(&self, submission: &SubmissionRecord) -> Result<()> {
        let api_url = match self.config.api_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => bail!("Email not configured"),
        };
        if self.config.recipients.is_empty() {
            bail!("No recipients configured");
        }

        let message = render(submission);
        let payload = json!({
            "from": self.config.from,
            "to": self.config.recipients,
            "replyTo": message.reply_to,
            "subject": message.subject,
            "text": message.text,
            "html": message.html,
        });

        let mut request = self.http.post(api_url).json(&payload);
        if let Some(token) = self.config.api_token.as_deref() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            bail!("Email HTTP {}", response.status().as_u16());
        }
        Ok(())
    }
}

struct RenderedEmail {
    subject: String,
    text: String,
    html: String,
    reply_to: Option<String>,
}

fn render(submission: &SubmissionRecord) -> RenderedEmail {
    match submission {
        SubmissionRecord::Booking(booking) => render_booking(booking),
        SubmissionRecord::Testimonial(testimonial) => render_testimonial(testimonial),
    }
}

fn render_booking(booking: &BookingRequest) -> RenderedEmail {
    let heading = booking.heading();
    let subject = format!(
        "New Booking Request - {} {}",
        booking.first_name, booking.last_name
    );

    let mut lines = vec![
        format!("Name: {} {}", booking.first_name, booking.last_name),
        format!("Email: {}", booking.email),
        format!("Phone: {}", booking.phone),
        format!("Address: {}", booking.address),
    ];
    if !booking.details.is_empty() {
        lines.push("Project Details:".to_string());
        lines.push(booking.details.clone());
    }

    RenderedEmail {
        subject,
        text: text_body(&heading, &lines),
        html: html_body(&heading, &lines, &["Project Details:"]),
        reply_to: Some(booking.email.clone()),
    }
}

fn render_testimonial(testimonial: &Testimonial) -> RenderedEmail {
    let heading = testimonial.heading();
    let subject = format!("New Testimonial - {}", testimonial.name);

    let mut lines = vec![
        format!("Name: {}", testimonial.name),
        format!("Project Details: {}", testimonial.project_details),
        format!("Date of Project: {}", testimonial.date_of_project),
    ];
    if !testimonial.location.is_empty() {
        lines.push(format!("Location: {}", testimonial.location));
    }
    lines.push(format!("Date Submitted: {}", testimonial.date_submitted));
    lines.push("Testimonial:".to_string());
    lines.push(testimonial.selected_option.clone());
    if !testimonial.additional_comments.is_empty() {
        lines.push("Additional Comments:".to_string());
        lines.push(testimonial.additional_comments.clone());
    }
    lines.push(format!("Signature: {}", testimonial.signature));

    RenderedEmail {
        subject,
        text: text_body(&heading, &lines),
        html: html_body(&heading, &lines, &["Testimonial:", "Additional Comments:"]),
        reply_to: None,
    }
}

fn text_body(heading: &str, lines: &[String]) -> String {
    let mut body = heading.to_string();
    for line in lines {
        body.push('\n');
        body.push_str(line);
    }
    body
}

// Sanitization has already removed angle brackets from every field, so the
// interpolated values cannot open tags here.
fn html_body(heading: &str, lines: &[String], section_labels: &[&str]) -> String {
    let mut body = String::from(
        "<div style=\"font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Cantarell,Noto Sans,sans-serif;line-height:1.5\">",
    );
    body.push_str(&format!("<h3>{}</h3>", heading));
    for line in lines {
        if section_labels.contains(&line.as_str()) {
            body.push_str(&format!("<h3 style=\"margin-top:20px\">{}</h3>", line));
        } else {
            body.push_str(&format!("<p>{}</p>", line));
        }
    }
    body.push_str("</div>");
    body
}
