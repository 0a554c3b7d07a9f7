//! HTTP Basic-auth extractor guarding the admin pages.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use nodewiz_core::store::SiteStore;
use rand_core::OsRng;

use crate::{AppState, error::Error, mail::Mailer};

/// Credentials accepted for the admin pages.
#[derive(Clone)]
pub struct AdminCredentials {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Zero-size marker: present in the handler means the request was authenticated.
pub struct AdminUser;

/// Hash `password` into a PHC string suitable for `ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

/// Verify Basic credentials from `headers` against `creds`.
///
/// Unconfigured credentials reject every request.
pub fn verify_auth(headers: &HeaderMap, creds: &AdminCredentials) -> Result<(), Error> {
  if creds.username.is_empty() || creds.password_hash.is_empty() {
    return Err(Error::Unauthorized);
  }

  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds_str = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds_str.split_once(':').ok_or(Error::Unauthorized)?;

  if username != creds.username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&creds.password_hash).map_err(|e| {
    tracing::error!(error = %e, "ADMIN_PASSWORD_HASH is not a valid PHC string");
    Error::Unauthorized
  })?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(())
}

impl<S, M> FromRequestParts<AppState<S, M>> for AdminUser
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.admin)?;
    Ok(AdminUser)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{HeaderValue, header};

  fn creds(password: &str) -> AdminCredentials {
    AdminCredentials {
      username:      "admin".to_string(),
      password_hash: hash_password(password).unwrap(),
    }
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = format!("Basic {}", B64.encode(format!("{user}:{pass}")));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
    headers
  }

  #[test]
  fn correct_credentials() {
    assert!(verify_auth(&basic("admin", "secret"), &creds("secret")).is_ok());
  }

  #[test]
  fn wrong_password() {
    assert!(matches!(
      verify_auth(&basic("admin", "wrong"), &creds("secret")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn wrong_username() {
    assert!(matches!(
      verify_auth(&basic("root", "secret"), &creds("secret")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &creds("secret")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic !!!not-base64!!!"));
    assert!(matches!(verify_auth(&headers, &creds("secret")), Err(Error::Unauthorized)));
  }

  #[test]
  fn unconfigured_admin_rejects_everyone() {
    let empty = AdminCredentials { username: String::new(), password_hash: String::new() };
    assert!(matches!(verify_auth(&basic("", ""), &empty), Err(Error::Unauthorized)));
  }
}
