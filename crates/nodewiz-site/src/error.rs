//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("not found")]
  NotFound,
  #[error("CSRF verification failed")]
  Csrf,
  #[error("xml error: {0}")]
  Xml(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"nodewiz admin\""),
        );
        res
      }
      Error::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
      Error::Csrf => (
        StatusCode::FORBIDDEN,
        "Forbidden (403): CSRF verification failed. Request aborted.",
      )
        .into_response(),
      e @ (Error::Xml(_) | Error::Store(_)) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
      }
    }
  }
}
