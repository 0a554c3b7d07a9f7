//! Encoding and decoding helpers between domain types and the plain SQLite
//! column representations.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order matches chronological order.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use nodewiz_core::{
  contact::ContactSubmission,
  testimonial::{Rating, Testimonial},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Build a `%term%` pattern for `LIKE … ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const SUBMISSION_COLUMNS: &str =
  "id, name, email, company, message, submitted_at";

/// Raw values read directly from a `contact_submissions` row.
pub struct RawSubmission {
  pub id:           i64,
  pub name:         String,
  pub email:        String,
  pub company:      String,
  pub message:      String,
  pub submitted_at: String,
}

impl RawSubmission {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      name:         row.get(1)?,
      email:        row.get(2)?,
      company:      row.get(3)?,
      message:      row.get(4)?,
      submitted_at: row.get(5)?,
    })
  }

  pub fn into_submission(self) -> Result<ContactSubmission> {
    Ok(ContactSubmission {
      id:           self.id,
      name:         self.name,
      email:        self.email,
      company:      self.company,
      message:      self.message,
      submitted_at: decode_dt(&self.submitted_at)?,
    })
  }
}

pub const TESTIMONIAL_COLUMNS: &str =
  "id, client_name, company, position, testimonial_text, rating, is_featured, created_at";

/// Raw values read directly from a `testimonials` row.
pub struct RawTestimonial {
  pub id:               i64,
  pub client_name:      String,
  pub company:          String,
  pub position:         String,
  pub testimonial_text: String,
  pub rating:           i64,
  pub is_featured:      bool,
  pub created_at:       String,
}

impl RawTestimonial {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      client_name:      row.get(1)?,
      company:          row.get(2)?,
      position:         row.get(3)?,
      testimonial_text: row.get(4)?,
      rating:           row.get(5)?,
      is_featured:      row.get(6)?,
      created_at:       row.get(7)?,
    })
  }

  pub fn into_testimonial(self) -> Result<Testimonial> {
    Ok(Testimonial {
      id:               self.id,
      client_name:      self.client_name,
      company:          self.company,
      position:         self.position,
      testimonial_text: self.testimonial_text,
      rating:           Rating::new(self.rating)?,
      is_featured:      self.is_featured,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let whole = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(encode_dt(whole), "2026-01-02T03:04:05.000000Z");
    assert_eq!(decode_dt(&encode_dt(whole)).unwrap(), whole);
  }

  #[test]
  fn lexical_order_matches_time_order() {
    let a = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    assert!(encode_dt(a) < encode_dt(b));
  }

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("acme"), "%acme%");
    assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
  }
}
