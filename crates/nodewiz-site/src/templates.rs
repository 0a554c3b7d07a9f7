//! Askama templates.
//!
//! Listing pages receive precomputed rows so the HTML stays free of
//! formatting logic.

use askama::Template;
use askama_web::WebTemplate;
use chrono::{DateTime, Utc};
use nodewiz_core::{
  contact::{ContactForm, ContactSubmission},
  store::DateFilter,
  testimonial::{Rating, Testimonial, TestimonialForm},
  validate::FieldErrors,
};

fn display_time(at: &DateTime<Utc>) -> String { at.format("%Y-%m-%d %H:%M UTC").to_string() }

fn stars(rating: Rating) -> String {
  let filled = usize::from(rating.get());
  let empty = usize::from(Rating::MAX) - filled;
  format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

// ─── Public pages ────────────────────────────────────────────────────────────

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "services.html")]
pub struct ServicesTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "use_cases.html")]
pub struct UseCasesTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
  pub csrf_token: String,
  pub flash:      Option<&'static str>,
  pub form:       ContactForm,
  pub errors:     FieldErrors,
}

#[derive(Template, WebTemplate)]
#[template(path = "testimonials.html")]
pub struct TestimonialsTemplate {
  pub testimonials: Vec<TestimonialCard>,
}

pub struct TestimonialCard {
  pub client_name: String,
  pub company:     String,
  pub position:    String,
  pub text:        String,
  pub rating:      u8,
  pub stars:       String,
}

impl From<Testimonial> for TestimonialCard {
  fn from(t: Testimonial) -> Self {
    Self {
      stars:       stars(t.rating),
      rating:      t.rating.get(),
      client_name: t.client_name,
      company:     t.company,
      position:    t.position,
      text:        t.testimonial_text,
    }
  }
}

// ─── Admin ───────────────────────────────────────────────────────────────────

/// An `<option>` in a filter or form select.
pub struct SelectOption {
  pub value:    String,
  pub label:    String,
  pub selected: bool,
}

impl SelectOption {
  fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
    Self { value: value.into(), label: label.into(), selected }
  }
}

/// Options for the date filter, led by an "any date" entry.
pub fn date_options(selected: Option<DateFilter>) -> Vec<SelectOption> {
  std::iter::once(SelectOption::new("", "Any date", selected.is_none()))
    .chain(
      DateFilter::ALL
        .into_iter()
        .map(|f| SelectOption::new(f.as_str(), f.label(), selected == Some(f))),
    )
    .collect()
}

/// Options for the rating filter, led by an "all" entry.
pub fn rating_filter_options(selected: Option<Rating>) -> Vec<SelectOption> {
  std::iter::once(SelectOption::new("", "All ratings", selected.is_none()))
    .chain(Rating::all().map(|r| {
      SelectOption::new(r.to_string(), format!("{r} stars"), selected == Some(r))
    }))
    .collect()
}

/// Options for the featured filter.
pub fn featured_filter_options(selected: Option<bool>) -> Vec<SelectOption> {
  vec![
    SelectOption::new("", "All", selected.is_none()),
    SelectOption::new("yes", "Featured", selected == Some(true)),
    SelectOption::new("no", "Not featured", selected == Some(false)),
  ]
}

/// Options for the rating field of the edit form. `raw` is the posted value,
/// which may not be a valid rating.
pub fn rating_choices(raw: &str) -> Vec<SelectOption> {
  Rating::all()
    .map(|r| {
      let value = r.to_string();
      let selected = value == raw.trim();
      SelectOption::new(value, format!("{} {r}", stars(r)), selected)
    })
    .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminIndexTemplate {
  pub submission_count:  u64,
  pub testimonial_count: u64,
}

pub struct SubmissionRow {
  pub id:           i64,
  pub name:         String,
  pub email:        String,
  pub company:      String,
  pub submitted_at: String,
}

impl From<ContactSubmission> for SubmissionRow {
  fn from(s: ContactSubmission) -> Self {
    Self {
      submitted_at: display_time(&s.submitted_at),
      id:           s.id,
      name:         s.name,
      email:        s.email,
      company:      s.company,
    }
  }
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/submissions.html")]
pub struct SubmissionListTemplate {
  pub rows:         Vec<SubmissionRow>,
  pub q:            String,
  pub date_options: Vec<SelectOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/submission.html")]
pub struct SubmissionDetailTemplate {
  pub title:        String,
  pub name:         String,
  pub email:        String,
  pub company:      String,
  pub message:      String,
  pub submitted_at: String,
}

impl From<ContactSubmission> for SubmissionDetailTemplate {
  fn from(s: ContactSubmission) -> Self {
    Self {
      title:        s.to_string(),
      submitted_at: display_time(&s.submitted_at),
      name:         s.name,
      email:        s.email,
      company:      s.company,
      message:      s.message,
    }
  }
}

pub struct TestimonialRow {
  pub id:          i64,
  pub client_name: String,
  pub company:     String,
  pub rating:      u8,
  pub is_featured: bool,
  pub created_at:  String,
}

impl From<Testimonial> for TestimonialRow {
  fn from(t: Testimonial) -> Self {
    Self {
      created_at:  display_time(&t.created_at),
      rating:      t.rating.get(),
      id:          t.id,
      client_name: t.client_name,
      company:     t.company,
      is_featured: t.is_featured,
    }
  }
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/testimonials.html")]
pub struct TestimonialListTemplate {
  pub csrf_token:       String,
  pub rows:             Vec<TestimonialRow>,
  pub q:                String,
  pub rating_options:   Vec<SelectOption>,
  pub featured_options: Vec<SelectOption>,
  pub date_options:     Vec<SelectOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/testimonial_form.html")]
pub struct TestimonialFormTemplate {
  pub heading:        String,
  pub action:         String,
  /// Present when editing an existing testimonial.
  pub delete_action:  Option<String>,
  pub csrf_token:     String,
  pub form:           TestimonialForm,
  pub errors:         FieldErrors,
  pub rating_options: Vec<SelectOption>,
}
