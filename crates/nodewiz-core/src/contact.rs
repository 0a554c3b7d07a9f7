//! Contact submissions: the record a visitor leaves through the public
//! contact form.
//!
//! Submissions are write-once. Nothing in the application updates or deletes
//! them; they are read back only through the admin listing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{FieldErrors, INVALID_EMAIL, max_chars, required, validate_email};

pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 254;
pub const COMPANY_MAX: usize = 100;

/// A persisted contact submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
  pub id:           i64,
  pub name:         String,
  pub email:        String,
  /// Empty when the visitor left the field blank.
  pub company:      String,
  pub message:      String,
  /// Server-assigned at insert time.
  pub submitted_at: DateTime<Utc>,
}

impl fmt::Display for ContactSubmission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} <{}>", self.name, self.email)
  }
}

/// Validated input for [`crate::store::SiteStore::create_submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactSubmission {
  pub name:    String,
  pub email:   String,
  pub company: String,
  pub message: String,
}

/// Raw form fields as posted by the browser.
///
/// Every field defaults to empty so a request with missing fields still
/// reaches validation and gets per-field messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
  #[serde(default)]
  pub name:    String,
  #[serde(default)]
  pub email:   String,
  #[serde(default)]
  pub company: String,
  #[serde(default)]
  pub message: String,
}

impl ContactForm {
  /// Trim and validate the posted fields.
  pub fn validate(&self) -> Result<NewContactSubmission, FieldErrors> {
    let name = self.name.trim();
    let email = self.email.trim();
    let company = self.company.trim();
    let message = self.message.trim();

    let mut errors = FieldErrors::new();

    if required(&mut errors, "name", name) {
      max_chars(&mut errors, "name", name, NAME_MAX);
    }
    if required(&mut errors, "email", email) {
      max_chars(&mut errors, "email", email, EMAIL_MAX);
      if !validate_email(email) {
        errors.add("email", INVALID_EMAIL);
      }
    }
    max_chars(&mut errors, "company", company, COMPANY_MAX);
    required(&mut errors, "message", message);

    errors.finish(NewContactSubmission {
      name:    name.to_owned(),
      email:   email.to_owned(),
      company: company.to_owned(),
      message: message.to_owned(),
    })
  }
}
