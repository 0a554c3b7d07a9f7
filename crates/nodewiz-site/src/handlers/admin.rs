//! Admin pages behind HTTP Basic auth.
//!
//! Contact submissions are read-only here: there are no routes that create,
//! edit, or delete them. Testimonials are fully editable.

use axum::{
  Form, Router,
  extract::{Path, Query, State},
  response::{AppendHeaders, IntoResponse, Redirect, Response},
  routing::{get, post},
};
use chrono::Utc;
use nodewiz_core::{
  store::{DateFilter, SiteStore, SubmissionQuery, TestimonialQuery},
  testimonial::{Rating, TestimonialForm},
  validate::FieldErrors,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::AdminUser,
  csrf::{CsrfToken, Posted},
  error::Error,
  mail::Mailer,
  templates::{
    AdminIndexTemplate, SubmissionDetailTemplate, SubmissionListTemplate, TestimonialFormTemplate,
    TestimonialListTemplate, date_options, featured_filter_options, rating_choices,
    rating_filter_options,
  },
};

const TESTIMONIALS_URL: &str = "/admin/testimonials/";

pub fn routes<S, M>() -> Router<AppState<S, M>>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  Router::new()
    .route("/admin/", get(index::<S, M>))
    .route("/admin/submissions/", get(submissions::<S, M>))
    .route("/admin/submissions/{id}/", get(submission::<S, M>))
    .route("/admin/testimonials/", get(testimonials::<S, M>))
    .route(
      "/admin/testimonials/new/",
      get(new_testimonial::<S, M>).post(create_testimonial::<S, M>),
    )
    .route(
      "/admin/testimonials/{id}/",
      get(edit_testimonial::<S, M>).post(update_testimonial::<S, M>),
    )
    .route("/admin/testimonials/{id}/featured/", post(toggle_featured::<S, M>))
    .route("/admin/testimonials/{id}/delete/", post(delete_testimonial::<S, M>))
}

// ─── Query strings and bodies ────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionFilters {
  pub q:    String,
  pub date: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestimonialFilters {
  pub q:        String,
  pub rating:   String,
  pub featured: String,
  pub date:     String,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedToggle {
  #[serde(default)]
  pub is_featured: String,
}

/// Body of a form whose only field is the CSRF token.
#[derive(Debug, Deserialize)]
pub struct Confirm {}

fn search_term(q: &str) -> Option<String> {
  let q = q.trim();
  (!q.is_empty()).then(|| q.to_owned())
}

/// Unrecognised filter values are ignored rather than rejected.
fn date_filter(raw: &str) -> Option<DateFilter> { raw.parse().ok() }

fn rating_filter(raw: &str) -> Option<Rating> {
  raw.trim().parse::<i64>().ok().and_then(|v| Rating::new(v).ok())
}

fn featured_filter(raw: &str) -> Option<bool> {
  match raw {
    "yes" | "true" | "1" => Some(true),
    "no" | "false" | "0" => Some(false),
    _ => None,
  }
}

// ─── Index ───────────────────────────────────────────────────────────────────

async fn index<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
) -> Result<AdminIndexTemplate, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  Ok(AdminIndexTemplate {
    submission_count:  state.store.count_submissions().await.map_err(Error::store)?,
    testimonial_count: state.store.count_testimonials().await.map_err(Error::store)?,
  })
}

// ─── Contact submissions ─────────────────────────────────────────────────────

async fn submissions<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
  Query(filters): Query<SubmissionFilters>,
) -> Result<SubmissionListTemplate, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let date = date_filter(&filters.date);
  let query = SubmissionQuery {
    search:          search_term(&filters.q),
    submitted_after: date.map(|d| d.since(Utc::now())),
    limit:           None,
  };
  let rows = state.store.list_submissions(&query).await.map_err(Error::store)?;

  Ok(SubmissionListTemplate {
    rows:         rows.into_iter().map(Into::into).collect(),
    q:            filters.q,
    date_options: date_options(date),
  })
}

async fn submission<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
  Path(id): Path<i64>,
) -> Result<SubmissionDetailTemplate, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  state
    .store
    .get_submission(id)
    .await
    .map_err(Error::store)?
    .map(Into::into)
    .ok_or(Error::NotFound)
}

// ─── Testimonials ────────────────────────────────────────────────────────────

async fn testimonials<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
  token: CsrfToken,
  Query(filters): Query<TestimonialFilters>,
) -> Result<Response, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let rating = rating_filter(&filters.rating);
  let featured = featured_filter(&filters.featured);
  let date = date_filter(&filters.date);
  let query = TestimonialQuery {
    search: search_term(&filters.q),
    rating,
    featured,
    created_after: date.map(|d| d.since(Utc::now())),
    limit: None,
  };
  let rows = state.store.list_testimonials(&query).await.map_err(Error::store)?;

  let page = TestimonialListTemplate {
    csrf_token:       token.value().to_owned(),
    rows:             rows.into_iter().map(Into::into).collect(),
    q:                filters.q,
    rating_options:   rating_filter_options(rating),
    featured_options: featured_filter_options(featured),
    date_options:     date_options(date),
  };
  Ok((AppendHeaders(token.set_cookie()), page).into_response())
}

fn form_page(
  id: Option<i64>,
  token: &CsrfToken,
  form: TestimonialForm,
  errors: FieldErrors,
) -> TestimonialFormTemplate {
  let (heading, action, delete_action) = match id {
    Some(id) => (
      "Change testimonial".to_owned(),
      format!("{TESTIMONIALS_URL}{id}/"),
      Some(format!("{TESTIMONIALS_URL}{id}/delete/")),
    ),
    None => ("Add testimonial".to_owned(), format!("{TESTIMONIALS_URL}new/"), None),
  };
  TestimonialFormTemplate {
    heading,
    action,
    delete_action,
    csrf_token: token.value().to_owned(),
    rating_options: rating_choices(&form.rating),
    form,
    errors,
  }
}

async fn new_testimonial<S, M>(_admin: AdminUser, token: CsrfToken) -> Response
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let page = form_page(None, &token, TestimonialForm::default(), FieldErrors::new());
  (AppendHeaders(token.set_cookie()), page).into_response()
}

async fn create_testimonial<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
  token: CsrfToken,
  Form(posted): Form<Posted<TestimonialForm>>,
) -> Result<Response, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  if !token.verify(&posted.csrf_token) {
    return Err(Error::Csrf);
  }
  let form = posted.form;
  match form.validate() {
    Err(errors) => Ok(form_page(None, &token, form, errors).into_response()),
    Ok(input) => {
      let created = state.store.create_testimonial(input).await.map_err(Error::store)?;
      tracing::info!(id = created.id, testimonial = %created, "testimonial created");
      Ok(Redirect::to(TESTIMONIALS_URL).into_response())
    }
  }
}

async fn edit_testimonial<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
  token: CsrfToken,
  Path(id): Path<i64>,
) -> Result<Response, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let testimonial = state
    .store
    .get_testimonial(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;

  let page = form_page(Some(id), &token, TestimonialForm::from(&testimonial), FieldErrors::new());
  Ok((AppendHeaders(token.set_cookie()), page).into_response())
}

async fn update_testimonial<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
  token: CsrfToken,
  Path(id): Path<i64>,
  Form(posted): Form<Posted<TestimonialForm>>,
) -> Result<Response, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  if !token.verify(&posted.csrf_token) {
    return Err(Error::Csrf);
  }
  let form = posted.form;
  match form.validate() {
    Err(errors) => Ok(form_page(Some(id), &token, form, errors).into_response()),
    Ok(input) => {
      let updated = state
        .store
        .update_testimonial(id, input)
        .await
        .map_err(Error::store)?
        .ok_or(Error::NotFound)?;
      tracing::info!(id, testimonial = %updated, "testimonial updated");
      Ok(Redirect::to(TESTIMONIALS_URL).into_response())
    }
  }
}

async fn toggle_featured<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
  token: CsrfToken,
  Path(id): Path<i64>,
  Form(posted): Form<Posted<FeaturedToggle>>,
) -> Result<Redirect, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  if !token.verify(&posted.csrf_token) {
    return Err(Error::Csrf);
  }
  let featured = featured_filter(&posted.form.is_featured).unwrap_or(false);
  if !state.store.set_featured(id, featured).await.map_err(Error::store)? {
    return Err(Error::NotFound);
  }
  tracing::info!(id, featured, "testimonial featured flag changed");
  Ok(Redirect::to(TESTIMONIALS_URL))
}

async fn delete_testimonial<S, M>(
  _admin: AdminUser,
  State(state): State<AppState<S, M>>,
  token: CsrfToken,
  Path(id): Path<i64>,
  Form(posted): Form<Posted<Confirm>>,
) -> Result<Redirect, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  if !token.verify(&posted.csrf_token) {
    return Err(Error::Csrf);
  }
  if !state.store.delete_testimonial(id).await.map_err(Error::store)? {
    return Err(Error::NotFound);
  }
  tracing::info!(id, "testimonial deleted");
  Ok(Redirect::to(TESTIMONIALS_URL))
}
