// ============================================================================
// Submission Records
// ============================================================================
//
// The two intake variants and their validation. A record is only ever
// constructed after every field has been sanitized and every required field
// found non-empty; validation failure deliberately does not say which field
// was at fault.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sanitize::{sanitize_email, sanitize_phone, sanitize_text};

/// Which intake form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Booking,
    Testimonial,
}

impl SubmissionKind {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionKind::Booking => "Booking Request",
            SubmissionKind::Testimonial => "Testimonial",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw booking fields as they arrive from a form or JSON body. Absent
/// fields deserialize to empty strings and fail validation the same way
/// empty submissions do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub details: String,
}

impl BookingFields {
    /// Sanitizes every field with its bound, then requires the full booking
    /// field set. `Err` carries the sanitized values so a form can be
    /// re-rendered populated; it says nothing about which field failed.
    pub fn validate(self) -> Result<BookingRequest, BookingFields> {
        let fields = BookingFields {
            first_name: sanitize_text(&self.first_name, 100),
            last_name: sanitize_text(&self.last_name, 100),
            email: sanitize_email(&self.email),
            phone: sanitize_phone(&self.phone),
            address: sanitize_text(&self.address, 200),
            details: sanitize_text(&self.details, 5000),
        };
        if fields.first_name.is_empty()
            || fields.last_name.is_empty()
            || fields.email.is_empty()
            || fields.phone.is_empty()
            || fields.address.is_empty()
            || fields.details.is_empty()
        {
            return Err(fields);
        }
        Ok(BookingRequest {
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone: fields.phone,
            address: fields.address,
            details: fields.details,
        })
    }
}

/// Raw testimonial fields. Same deserialization behavior as
/// [`BookingFields`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestimonialFields {
    pub name: String,
    pub project_details: String,
    pub date_of_project: String,
    pub location: String,
    pub selected_option: String,
    pub additional_comments: String,
    pub signature: String,
    pub date_submitted: String,
}

impl TestimonialFields {
    /// Sanitizes every field, then requires the testimonial field set.
    /// `location` and `additional_comments` are optional.
    pub fn validate(self) -> Result<Testimonial, TestimonialFields> {
        let fields = TestimonialFields {
            name: sanitize_text(&self.name, 200),
            project_details: sanitize_text(&self.project_details, 2000),
            date_of_project: sanitize_text(&self.date_of_project, 100),
            location: sanitize_text(&self.location, 200),
            selected_option: sanitize_text(&self.selected_option, 5000),
            additional_comments: sanitize_text(&self.additional_comments, 5000),
            signature: sanitize_text(&self.signature, 200),
            date_submitted: sanitize_text(&self.date_submitted, 100),
        };
        if fields.name.is_empty()
            || fields.project_details.is_empty()
            || fields.date_of_project.is_empty()
            || fields.selected_option.is_empty()
            || fields.signature.is_empty()
            || fields.date_submitted.is_empty()
        {
            return Err(fields);
        }
        Ok(Testimonial {
            name: fields.name,
            project_details: fields.project_details,
            date_of_project: fields.date_of_project,
            location: fields.location,
            selected_option: fields.selected_option,
            additional_comments: fields.additional_comments,
            signature: fields.signature,
            date_submitted: fields.date_submitted,
        })
    }
}

/// A validated booking request. Every field is sanitized and every required
/// field is non-empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub details: String,
}

impl BookingRequest {
    pub fn heading(&self) -> String {
        format!(
            "New Booking Request from {} {}",
            self.first_name, self.last_name
        )
    }
}

/// A validated testimonial. `location` and `additional_comments` may be
/// empty; everything else is non-empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub name: String,
    pub project_details: String,
    pub date_of_project: String,
    pub location: String,
    pub selected_option: String,
    pub additional_comments: String,
    pub signature: String,
    pub date_submitted: String,
}

impl Testimonial {
    pub fn heading(&self) -> String {
        format!("New Testimonial from {}", self.name)
    }
}

/// One normalized submission ready for dispatch.
#[derive(Debug, Clone)]
pub enum SubmissionRecord {
    Booking(BookingRequest),
    Testimonial(Testimonial),
}

impl SubmissionRecord {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            SubmissionRecord::Booking(_) => SubmissionKind::Booking,
            SubmissionRecord::Testimonial(_) => SubmissionKind::Testimonial,
        }
    }

    /// The submitter's display name used in headings and log redaction.
    pub fn primary_name(&self) -> String {
        match self {
            SubmissionRecord::Booking(b) => format!("{} {}", b.first_name, b.last_name),
            SubmissionRecord::Testimonial(t) => t.name.clone(),
        }
    }

    /// Human-readable heading shared by both notification channels.
    pub fn heading(&self) -> String {
        match self {
            SubmissionRecord::Booking(b) => b.heading(),
            SubmissionRecord::Testimonial(t) => t.heading(),
        }
    }
}
