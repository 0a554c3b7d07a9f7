//! Contact form: validate, persist, notify, redirect.

use axum::{
  Form,
  extract::State,
  http::{HeaderMap, HeaderName, header},
  response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use nodewiz_core::{
  contact::{ContactForm, ContactSubmission},
  store::SiteStore,
  validate::FieldErrors,
};

use crate::{
  AppState,
  cookies::{self, FLASH_COOKIE, Flash},
  csrf::{CsrfToken, Posted},
  error::Error,
  mail::{Mailer, Notification},
  templates::ContactTemplate,
};

/// `GET /contact/`: the empty form, plus the success banner after a redirect.
pub async fn show<S, M>(token: CsrfToken, headers: HeaderMap) -> Response
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let flash = Flash::pending(&headers);

  let mut set_cookies: Vec<(HeaderName, String)> = token.set_cookie().into_iter().collect();
  if flash.is_some() {
    set_cookies.push((header::SET_COOKIE, cookies::clear(FLASH_COOKIE)));
  }

  let page = ContactTemplate {
    csrf_token: token.value().to_owned(),
    flash:      flash.map(Flash::message),
    form:       ContactForm::default(),
    errors:     FieldErrors::new(),
  };
  (AppendHeaders(set_cookies), page).into_response()
}

/// `POST /contact/`.
///
/// Invalid input re-renders the form with the submitted values. A valid
/// submission is stored, the team is notified, and the browser is sent back
/// to the form with a one-shot success message.
pub async fn submit<S, M>(
  State(state): State<AppState<S, M>>,
  token: CsrfToken,
  Form(posted): Form<Posted<ContactForm>>,
) -> Result<Response, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  if !token.verify(&posted.csrf_token) {
    return Err(Error::Csrf);
  }

  let form = posted.form;
  let input = match form.validate() {
    Ok(input) => input,
    Err(errors) => {
      let page = ContactTemplate {
        csrf_token: token.value().to_owned(),
        flash: None,
        form,
        errors,
      };
      return Ok(page.into_response());
    }
  };

  let submission = state.store.create_submission(input).await.map_err(Error::store)?;
  tracing::info!(id = submission.id, from = %submission, "contact submission received");

  notify(&state, &submission).await;

  let flash = Flash::ContactSent.cookie(state.config.secure_ssl_redirect);
  Ok((AppendHeaders([(header::SET_COOKIE, flash)]), Redirect::to("/contact/")).into_response())
}

/// Best-effort notification; a failure never reaches the visitor.
async fn notify<S, M>(state: &AppState<S, M>, submission: &ContactSubmission)
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let message = Notification::contact_submission(
    submission,
    &state.config.default_from_email,
    &state.config.contact_notify_email,
  );
  if let Err(e) = state.mailer.send(&message).await {
    tracing::warn!(id = submission.id, error = %e, "failed to send contact notification");
  }
}
