//! Public testimonials listing.

use axum::extract::State;
use nodewiz_core::store::{FEATURED_LIMIT, SiteStore};

use crate::{AppState, error::Error, mail::Mailer, templates::TestimonialsTemplate};

/// Up to [`FEATURED_LIMIT`] featured testimonials, newest first.
pub async fn list<S, M>(State(state): State<AppState<S, M>>) -> Result<TestimonialsTemplate, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let testimonials = state
    .store
    .featured_testimonials(FEATURED_LIMIT)
    .await
    .map_err(Error::store)?;

  Ok(TestimonialsTemplate {
    testimonials: testimonials.into_iter().map(Into::into).collect(),
  })
}
