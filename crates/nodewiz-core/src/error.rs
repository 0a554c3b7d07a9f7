//! Error types for `nodewiz-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("rating {0} is outside 1..=5")]
  RatingOutOfRange(i64),

  #[error("unknown date filter: {0:?}")]
  UnknownDateFilter(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
