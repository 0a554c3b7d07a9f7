//! The `SiteStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `nodewiz-store-sqlite`).
//! The web layer depends on this abstraction, not on any concrete backend.

use std::{future::Future, str::FromStr};

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};

use crate::{
  Error,
  contact::{ContactSubmission, NewContactSubmission},
  testimonial::{NewTestimonial, Rating, Testimonial},
};

/// How many featured testimonials the public page shows.
pub const FEATURED_LIMIT: usize = 6;

// ─── Date filter ─────────────────────────────────────────────────────────────

/// Coarse "recent records" filter used by the admin listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
  Today,
  PastWeek,
  ThisMonth,
  ThisYear,
}

impl DateFilter {
  pub const ALL: [DateFilter; 4] =
    [Self::Today, Self::PastWeek, Self::ThisMonth, Self::ThisYear];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Today => "today",
      Self::PastWeek => "past-7-days",
      Self::ThisMonth => "this-month",
      Self::ThisYear => "this-year",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Today => "Today",
      Self::PastWeek => "Past 7 days",
      Self::ThisMonth => "This month",
      Self::ThisYear => "This year",
    }
  }

  /// Inclusive lower bound for records matching this filter, relative to `now`.
  pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let day = match self {
      Self::Today => today,
      Self::PastWeek => today - Duration::days(7),
      Self::ThisMonth => today.with_day(1).unwrap_or(today),
      Self::ThisYear => today.with_ordinal(1).unwrap_or(today),
    };
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
  }
}

impl FromStr for DateFilter {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|f| f.as_str() == s)
      .ok_or_else(|| Error::UnknownDateFilter(s.to_owned()))
  }
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`SiteStore::list_submissions`].
#[derive(Debug, Clone, Default)]
pub struct SubmissionQuery {
  /// Case-insensitive substring match over name, email and company.
  pub search:          Option<String>,
  pub submitted_after: Option<DateTime<Utc>>,
  pub limit:           Option<usize>,
}

/// Parameters for [`SiteStore::list_testimonials`].
#[derive(Debug, Clone, Default)]
pub struct TestimonialQuery {
  /// Case-insensitive substring match over client name and company.
  pub search:        Option<String>,
  pub rating:        Option<Rating>,
  pub featured:      Option<bool>,
  pub created_after: Option<DateTime<Utc>>,
  pub limit:         Option<usize>,
}

impl TestimonialQuery {
  /// The public listing: featured only, newest first, capped.
  pub fn featured(limit: usize) -> Self {
    Self {
      featured: Some(true),
      limit: Some(limit),
      ..Self::default()
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the site's persistence backend.
///
/// Listings are always ordered newest first, ties broken by descending id.
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait SiteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Contact submissions ───────────────────────────────────────────────

  /// Persist a submission. `id` and `submitted_at` are assigned by the store.
  fn create_submission(
    &self,
    input: NewContactSubmission,
  ) -> impl Future<Output = Result<ContactSubmission, Self::Error>> + Send + '_;

  fn get_submission(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ContactSubmission>, Self::Error>> + Send + '_;

  fn list_submissions<'a>(
    &'a self,
    query: &'a SubmissionQuery,
  ) -> impl Future<Output = Result<Vec<ContactSubmission>, Self::Error>> + Send + 'a;

  fn count_submissions(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Testimonials ──────────────────────────────────────────────────────

  /// Persist a testimonial. `id` and `created_at` are assigned by the store.
  fn create_testimonial(
    &self,
    input: NewTestimonial,
  ) -> impl Future<Output = Result<Testimonial, Self::Error>> + Send + '_;

  fn get_testimonial(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Testimonial>, Self::Error>> + Send + '_;

  /// Replace every editable field; `created_at` is preserved. Returns `None`
  /// if no testimonial has this id.
  fn update_testimonial(
    &self,
    id: i64,
    input: NewTestimonial,
  ) -> impl Future<Output = Result<Option<Testimonial>, Self::Error>> + Send + '_;

  /// Returns `false` if no testimonial has this id.
  fn set_featured(
    &self,
    id: i64,
    is_featured: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if no testimonial has this id.
  fn delete_testimonial(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_testimonials<'a>(
    &'a self,
    query: &'a TestimonialQuery,
  ) -> impl Future<Output = Result<Vec<Testimonial>, Self::Error>> + Send + 'a;

  fn count_testimonials(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// At most `limit` featured testimonials, newest first.
  fn featured_testimonials(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Testimonial>, Self::Error>> + Send + '_ {
    async move {
      let query = TestimonialQuery::featured(limit);
      self.list_testimonials(&query).await
    }
  }
}
