//! Testimonials: admin-curated client endorsements.
//!
//! Only testimonials flagged as featured are ever shown on the public site.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  validate::{FieldErrors, max_chars, required},
};

pub const CLIENT_NAME_MAX: usize = 100;
pub const COMPANY_MAX: usize = 100;
pub const POSITION_MAX: usize = 100;

// ─── Rating ──────────────────────────────────────────────────────────────────

/// A star rating, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  pub fn new(value: i64) -> Result<Self, Error> {
    if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
      Ok(Self(value as u8))
    } else {
      Err(Error::RatingOutOfRange(value))
    }
  }

  pub fn get(self) -> u8 { self.0 }

  /// All valid ratings, lowest first.
  pub fn all() -> impl Iterator<Item = Rating> { (Self::MIN..=Self::MAX).map(Rating) }
}

impl Default for Rating {
  fn default() -> Self { Self(Self::MAX) }
}

impl TryFrom<i64> for Rating {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Rating> for i64 {
  fn from(rating: Rating) -> Self { i64::from(rating.0) }
}

impl fmt::Display for Rating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted testimonial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
  pub id:               i64,
  pub client_name:      String,
  pub company:          String,
  /// Empty when no position was given.
  pub position:         String,
  pub testimonial_text: String,
  pub rating:           Rating,
  pub is_featured:      bool,
  pub created_at:       DateTime<Utc>,
}

impl fmt::Display for Testimonial {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.client_name, self.company)
  }
}

/// Validated input for creating or replacing a testimonial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestimonial {
  pub client_name:      String,
  pub company:          String,
  pub position:         String,
  pub testimonial_text: String,
  pub rating:           Rating,
  pub is_featured:      bool,
}

impl NewTestimonial {
  /// A testimonial with the default rating, not featured.
  pub fn new(
    client_name: impl Into<String>,
    company: impl Into<String>,
    testimonial_text: impl Into<String>,
  ) -> Self {
    Self {
      client_name:      client_name.into(),
      company:          company.into(),
      position:         String::new(),
      testimonial_text: testimonial_text.into(),
      rating:           Rating::default(),
      is_featured:      false,
    }
  }

  pub fn featured(mut self, is_featured: bool) -> Self {
    self.is_featured = is_featured;
    self
  }

  pub fn rating(mut self, rating: Rating) -> Self {
    self.rating = rating;
    self
  }
}

// ─── Admin form ──────────────────────────────────────────────────────────────

/// Raw admin form fields for a testimonial.
#[derive(Debug, Clone, Deserialize)]
pub struct TestimonialForm {
  #[serde(default)]
  pub client_name:      String,
  #[serde(default)]
  pub company:          String,
  #[serde(default)]
  pub position:         String,
  #[serde(default)]
  pub testimonial_text: String,
  #[serde(default)]
  pub rating:           String,
  /// HTML checkboxes are absent when unchecked.
  #[serde(default)]
  pub is_featured:      Option<String>,
}

impl Default for TestimonialForm {
  fn default() -> Self {
    Self {
      client_name:      String::new(),
      company:          String::new(),
      position:         String::new(),
      testimonial_text: String::new(),
      rating:           Rating::default().to_string(),
      is_featured:      None,
    }
  }
}

impl From<&Testimonial> for TestimonialForm {
  fn from(t: &Testimonial) -> Self {
    Self {
      client_name:      t.client_name.clone(),
      company:          t.company.clone(),
      position:         t.position.clone(),
      testimonial_text: t.testimonial_text.clone(),
      rating:           t.rating.to_string(),
      is_featured:      t.is_featured.then(|| "on".to_owned()),
    }
  }
}

impl TestimonialForm {
  pub fn featured_checked(&self) -> bool {
    self
      .is_featured
      .as_deref()
      .is_some_and(|v| matches!(v, "on" | "true" | "1"))
  }

  pub fn validate(&self) -> Result<NewTestimonial, FieldErrors> {
    let client_name = self.client_name.trim();
    let company = self.company.trim();
    let position = self.position.trim();
    let text = self.testimonial_text.trim();
    let rating_raw = self.rating.trim();

    let mut errors = FieldErrors::new();

    if required(&mut errors, "client_name", client_name) {
      max_chars(&mut errors, "client_name", client_name, CLIENT_NAME_MAX);
    }
    if required(&mut errors, "company", company) {
      max_chars(&mut errors, "company", company, COMPANY_MAX);
    }
    max_chars(&mut errors, "position", position, POSITION_MAX);
    required(&mut errors, "testimonial_text", text);

    let mut rating = Rating::default();
    if required(&mut errors, "rating", rating_raw) {
      match rating_raw.parse::<i64>().ok().and_then(|v| Rating::new(v).ok()) {
        Some(r) => rating = r,
        None => errors.add(
          "rating",
          format!("Select a valid choice. {rating_raw} is not one of the available choices."),
        ),
      }
    }

    errors.finish(NewTestimonial {
      client_name: client_name.to_owned(),
      company: company.to_owned(),
      position: position.to_owned(),
      testimonial_text: text.to_owned(),
      rating,
      is_featured: self.featured_checked(),
    })
  }
}
