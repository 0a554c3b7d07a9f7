//! Double-submit CSRF protection.
//!
//! The `csrftoken` cookie holds `nonce.signature`, where the signature is
//! `hex(sha256(secret_key ":" nonce))`. Every form echoes the cookie value in
//! a hidden `csrf_token` field; a POST is accepted only if the cookie carries
//! a valid signature and the field matches it exactly.

use std::convert::Infallible;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderName, header, request::Parts},
};
use nodewiz_core::store::SiteStore;
use rand_core::{OsRng, RngCore};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{AppState, cookies, mail::Mailer};

pub const COOKIE: &str = "csrftoken";
pub const FIELD: &str = "csrf_token";

/// A posted form together with its CSRF field.
#[derive(Debug, Deserialize)]
pub struct Posted<T> {
  #[serde(default)]
  pub csrf_token: String,
  #[serde(flatten)]
  pub form:       T,
}

/// The request's CSRF token: either the valid one from its cookie or a
/// freshly issued one that still has to be sent back with `Set-Cookie`.
#[derive(Debug, Clone)]
pub struct CsrfToken {
  value:  String,
  fresh:  bool,
  secure: bool,
}

impl CsrfToken {
  /// Issue a new token signed with `secret`.
  pub fn issue(secret: &str, secure: bool) -> Self {
    let mut nonce = [0u8; 16];
    OsRng.fill_bytes(&mut nonce);
    let nonce = hex::encode(nonce);
    let value = format!("{nonce}.{}", sign(secret, &nonce));
    Self { value, fresh: true, secure }
  }

  /// The token carried by the request cookie, if its signature checks out.
  pub fn from_headers(headers: &HeaderMap, secret: &str, secure: bool) -> Option<Self> {
    let value = cookies::get(headers, COOKIE)?;
    let (nonce, signature) = value.split_once('.')?;
    if nonce.is_empty() || !constant_time_eq(sign(secret, nonce).as_bytes(), signature.as_bytes()) {
      return None;
    }
    Some(Self { value: value.to_owned(), fresh: false, secure })
  }

  /// Value to embed in the form's hidden field.
  pub fn value(&self) -> &str { &self.value }

  /// `Set-Cookie` header for a freshly issued token.
  pub fn set_cookie(&self) -> Option<(HeaderName, String)> {
    self
      .fresh
      .then(|| (header::SET_COOKIE, cookies::set(COOKIE, &self.value, None, self.secure)))
  }

  /// Whether `submitted` proves the POST came from one of our forms.
  ///
  /// A freshly issued token never verifies: the browser did not send one.
  pub fn verify(&self, submitted: &str) -> bool {
    !self.fresh && constant_time_eq(self.value.as_bytes(), submitted.trim().as_bytes())
  }
}

fn sign(secret: &str, nonce: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(secret.as_bytes());
  hasher.update(b":");
  hasher.update(nonce.as_bytes());
  hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl<S, M> FromRequestParts<AppState<S, M>> for CsrfToken
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    let secret = &state.config.secret_key;
    let secure = state.config.secure_ssl_redirect;
    Ok(
      CsrfToken::from_headers(&parts.headers, secret, secure)
        .unwrap_or_else(|| CsrfToken::issue(secret, secure)),
    )
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn cookie_headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::COOKIE, HeaderValue::from_str(&format!("{COOKIE}={value}")).unwrap());
    h
  }

  #[test]
  fn issued_token_round_trips_through_cookie() {
    let issued = CsrfToken::issue("s3cret", false);
    assert!(issued.set_cookie().is_some());
    assert!(!issued.verify(issued.value()));

    let echoed = CsrfToken::from_headers(&cookie_headers(issued.value()), "s3cret", false).unwrap();
    assert!(echoed.set_cookie().is_none());
    assert!(echoed.verify(issued.value()));
    assert!(!echoed.verify("something-else"));
    assert!(!echoed.verify(""));
  }

  #[test]
  fn forged_or_foreign_cookies_are_ignored() {
    let issued = CsrfToken::issue("s3cret", false);
    assert!(CsrfToken::from_headers(&cookie_headers(issued.value()), "other", false).is_none());

    let (nonce, _) = issued.value().split_once('.').unwrap();
    let forged = format!("{nonce}.{}", "0".repeat(64));
    assert!(CsrfToken::from_headers(&cookie_headers(&forged), "s3cret", false).is_none());
    assert!(CsrfToken::from_headers(&cookie_headers("garbage"), "s3cret", false).is_none());
  }

  #[test]
  fn tokens_are_unique() {
    let a = CsrfToken::issue("k", false);
    let b = CsrfToken::issue("k", false);
    assert_ne!(a.value(), b.value());
  }
}
