//! Error types for `scribe-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A write was rejected by a uniqueness rule in the store.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
