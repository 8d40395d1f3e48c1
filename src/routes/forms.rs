// ============================================================================
// Browser Form Handlers
// ============================================================================
//
// The browser-facing submission path: admission gate, validation, then a
// forward to the notification endpoint with the shared API key. Failure
// responses echo the sanitized values so the form can be re-rendered
// populated, and carry exactly one generic error string - gate and
// validation failures are indistinguishable from the outside.
//
// ============================================================================

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::AppContext;
use crate::gate::{self, FormDefenses};
use crate::submission::{BookingFields, SubmissionKind, TestimonialFields};

const GENERIC_REJECTION: &str = "Please fill out all required fields with valid values.";

/// Booking form payload: the visible fields plus the three defense fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub details: String,
    /// Honeypot. Humans never see this field; any value means a bot.
    pub referrer: String,
    pub form_ts: String,
    pub csrf_token: String,
}

/// Testimonial form payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestimonialForm {
    pub name: String,
    #[serde(rename = "projectDetails")]
    pub project_details: String,
    #[serde(rename = "dateOfProject")]
    pub date_of_project: String,
    pub location: String,
    #[serde(rename = "selectedOption")]
    pub selected_option: String,
    #[serde(rename = "additionalComments")]
    pub additional_comments: String,
    pub signature: String,
    #[serde(rename = "dateSubmitted")]
    pub date_submitted: String,
    pub referrer: String,
    pub form_ts: String,
    pub csrf_token: String,
}

/// POST /forms/booking-request
pub async fn submit_booking(
    State(app_context): State<Arc<AppContext>>,
    headers: HeaderMap,
    Form(form): Form<BookingForm>,
) -> Response {
    let defenses = FormDefenses {
        honeypot: &form.referrer,
        form_ts: &form.form_ts,
        csrf_token: &form.csrf_token,
    };
    if let Err(denial) = gate::admit(
        &headers,
        &defenses,
        app_context.config.signing_secret.as_deref(),
    ) {
        tracing::warn!(
            kind = %SubmissionKind::Booking,
            reason = %denial,
            "form submission rejected at admission gate"
        );
        return failure(StatusCode::BAD_REQUEST, None, GENERIC_REJECTION);
    }

    let fields = BookingFields {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        phone: form.phone,
        address: form.address,
        details: form.details,
    };
    let record = match fields.validate() {
        Ok(record) => record,
        Err(rejected) => {
            tracing::debug!(kind = %SubmissionKind::Booking, "form submission failed validation");
            return failure(
                StatusCode::BAD_REQUEST,
                Some(echo(&rejected)),
                GENERIC_REJECTION,
            );
        }
    };

    forward(&app_context, SubmissionKind::Booking, &record).await
}

/// POST /forms/testimonial
pub async fn submit_testimonial(
    State(app_context): State<Arc<AppContext>>,
    headers: HeaderMap,
    Form(form): Form<TestimonialForm>,
) -> Response {
    let defenses = FormDefenses {
        honeypot: &form.referrer,
        form_ts: &form.form_ts,
        csrf_token: &form.csrf_token,
    };
    if let Err(denial) = gate::admit(
        &headers,
        &defenses,
        app_context.config.signing_secret.as_deref(),
    ) {
        tracing::warn!(
            kind = %SubmissionKind::Testimonial,
            reason = %denial,
            "form submission rejected at admission gate"
        );
        return failure(StatusCode::BAD_REQUEST, None, GENERIC_REJECTION);
    }

    let fields = TestimonialFields {
        name: form.name,
        project_details: form.project_details,
        date_of_project: form.date_of_project,
        location: form.location,
        selected_option: form.selected_option,
        additional_comments: form.additional_comments,
        signature: form.signature,
        date_submitted: form.date_submitted,
    };
    let record = match fields.validate() {
        Ok(record) => record,
        Err(rejected) => {
            tracing::debug!(kind = %SubmissionKind::Testimonial, "form submission failed validation");
            return failure(
                StatusCode::BAD_REQUEST,
                Some(echo(&rejected)),
                GENERIC_REJECTION,
            );
        }
    };

    forward(&app_context, SubmissionKind::Testimonial, &record).await
}

/// Forwards a validated submission to the notification endpoint for its
/// kind, carrying the shared API key. The forward is the only part of the
/// browser path that can fail after admission; its failures come back as
/// 422 with the values echoed.
async fn forward<T: Serialize>(
    app_context: &AppContext,
    kind: SubmissionKind,
    record: &T,
) -> Response {
    let values = echo(record);

    let Some(api_key) = app_context.config.api_secret(kind) else {
        tracing::error!(kind = %kind, "cannot forward submission - shared secret is not set");
        return failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(values),
            "Server not configured.",
        );
    };

    let path = match kind {
        SubmissionKind::Booking => "booking-request",
        SubmissionKind::Testimonial => "testimonial",
    };
    let url = format!(
        "{}/notify/{}",
        app_context.config.notify_api_url.trim_end_matches('/'),
        path
    );

    match app_context
        .http
        .post(&url)
        .header("x-api-key", api_key)
        .json(record)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => {
            Json(json!({ "success": true })).into_response()
        }
        Ok(response) => {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(kind = %kind, status = %status, "notification forward failed");
            failure(
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(values),
                &format!(
                    "Failed to submit {} ({}). {}",
                    kind.label().to_lowercase(),
                    status,
                    body
                ),
            )
        }
        Err(err) => {
            tracing::error!(kind = %kind, error = %err, "notification forward failed");
            failure(
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(values),
                "Submission failed",
            )
        }
    }
}

fn echo<T: Serialize>(values: &T) -> Value {
    serde_json::to_value(values).unwrap_or_else(|_| json!({}))
}

fn failure(status: StatusCode, values: Option<Value>, error: &str) -> Response {
    let mut body = json!({ "success": false, "error": error });
    if let Some(values) = values {
        body["values"] = values;
    }
    (status, Json(body)).into_response()
}
